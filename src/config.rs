pub struct Config {
    pub dump_ast: bool,
}

impl Config {
    pub(crate) fn new() -> Self {
        Config { dump_ast: false }
    }
}
