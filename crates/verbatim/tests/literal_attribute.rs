//! Integration tests for the `#[verbatim::literal]` marker attribute.
//!
//! The attribute must leave every supported item kind untouched, so these
//! items have to compile and behave exactly as if it were absent.

use verbatim::literal;

mod app {
    pub mod resources {
        pub struct Strings;
    }
}

#[literal("app::resources::Strings")]
#[derive(Debug, Clone, PartialEq)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

#[verbatim::literal("app::resources::Strings", field_name = "[Namespace]_[Class]")]
pub enum Shape {
    Dot(Point),
    Line(Point, Point),
}

#[literal("app::resources::Strings", FieldName = "Answer")]
pub const ANSWER: u32 = 42;

#[literal("app::resources::Strings", field_name = "Double")]
pub fn double(value: u32) -> u32 {
    value * 2
}

#[literal("app::resources::Strings", field_name = "Double")]
pub trait Area {
    fn area(&self) -> f64;
}

impl Point {
    #[literal("app::resources::Strings", field_name = "[FullName]")]
    pub fn origin() -> Self {
        Self { x: 0, y: 0 }
    }
}

#[test]
fn items_pass_through_unchanged() {
    let p = Point::origin();
    assert_eq!(p.clone(), Point { x: 0, y: 0 });
    assert_eq!(double(ANSWER), 84);
    assert!(matches!(Shape::Dot(p), Shape::Dot(Point { x: 0, .. })));
}

#[test]
fn generator_sees_the_same_markers() {
    let source = include_str!("literal_attribute.rs");
    let result = verbatim::Generator::builder()
        .root("/virtual")
        .source("src/lib.rs", source)
        .build()
        .expect("build")
        .generate()
        .expect("generate");

    let artifact = result
        .artifact("app::resources::Strings")
        .expect("Strings artifact");
    assert_eq!(
        artifact.members,
        vec!["Text", "_Shape", "Answer", "Double", "Double", "Point_origin"]
    );
    assert_eq!(result.diagnostics.len(), 1);
    assert_eq!(result.diagnostics[0].code, "VB001");
}
