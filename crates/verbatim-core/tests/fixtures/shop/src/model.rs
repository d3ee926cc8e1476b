use serde::Serialize;
use std::collections::HashMap;
use verbatim::literal;

pub mod ns {
    use super::Catalog;
    use verbatim::literal as embed;

    #[derive(Debug, Clone)]
    #[embed("app::resources::Docs", field_name = "[Namespace]_[Class]")]
    pub struct Thing {
        pub catalog: Catalog,
    }
}

#[derive(Debug, Clone, Default, Serialize)]
#[literal("app::resources::Strings")]
pub struct Catalog {
    pub items: HashMap<String, Item>,
}

#[derive(Debug, Clone, Serialize)]
#[literal("model::Item")]
pub struct Item {
    pub price: u32,
}

#[literal("Foo")]
pub struct Ignored;

#[cfg_attr(test, derive(PartialEq))]
#[cfg_attr(all(), literal("app::resources::Docs", field_name = "Kind"))]
#[doc = "kind"]
pub enum Kind {
    A,
    B,
}

#[literal("app::resources::Strings", field_name = "Raw")]
pub const RAW: &str = r##"a "# b"##;

impl Catalog {
    #[literal("app::resources::Docs", field_name = "[FullName]")]
    pub fn get(&self, key: &str) -> Option<&Item> {
        self.items.get(key)
    }
}
