pub struct Strings;

pub struct Docs;
