pub mod cli;
pub mod config;

use clap::App;

use crate::config::Config;

fn main() {
    let args = App::new("sulfur")
        .version("0.1.0")
        .about("Sulfur: a Scheme-flavored language translated to JavaScript")
        .args_from_usage(
            "-i, --repl        'Starts an interactive translation shell'
            -d, --dump-ast    'Dumps the desugared syntax tree before translation'
            [INPUT]           'Translate file'",
        )
        .get_matches();

    let mut cfg = Config::new();
    cfg.dump_ast = args.is_present("dump-ast");

    if args.is_present("repl") {
        cli::cli_main::cli_main(cfg, None);
    } else {
        cli::cli_main::cli_main(cfg, args.value_of("INPUT").map(|e| e.to_owned()));
    }
}
