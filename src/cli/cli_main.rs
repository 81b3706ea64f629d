use rustyline::{
    completion::{Candidate, Completer},
    error::ReadlineError,
    highlight::Highlighter,
    hint::Hinter,
    validate::Validator,
    Context as RContext, Editor, Helper, Result as RResult,
};

use lang::{
    codegen::{js::JsCodeGenerator, CodeGenerator},
    syntax::parse::PRIMITIVES,
    CompileError, Compiler,
};

use crate::config::Config;

struct REPL {
    rl: Editor<REPLHelper>,
    history_file: Option<String>,
    cfg: Config,
    repl_run: bool,
    prompt: String,
    multiline: bool,
    multiline_buffer: Vec<String>,
}

enum CompleteCandidate {
    Command(String, String),
    Prim(String),
}

impl Candidate for CompleteCandidate {
    fn display(&self) -> &str {
        match self {
            CompleteCandidate::Command(cmd, _) => cmd,
            CompleteCandidate::Prim(name) => name,
        }
    }

    fn replacement(&self) -> &str {
        match self {
            CompleteCandidate::Command(cmd, _) => cmd,
            CompleteCandidate::Prim(name) => name,
        }
    }
}

struct REPLHelper;

impl Helper for REPLHelper {}

impl Completer for REPLHelper {
    type Candidate = CompleteCandidate;

    fn complete(
        &self,
        line: &str,
        _pos: usize,
        _ctx: &RContext<'_>,
    ) -> RResult<(usize, Vec<Self::Candidate>)> {
        if line.starts_with(":") {
            let commands = vec![
                (":q", "Quit shell"),
                (":{", "Start multi-line mode"),
                (":}", "End multi-line mode"),
                (":prims", "List primitive operators"),
            ];
            Ok((
                line.len(),
                commands
                    .into_iter()
                    .filter(|it| it.0.starts_with(line))
                    .map(|it| (it.0.split_at(line.len()).1, it.1))
                    .map(|it| CompleteCandidate::Command(it.0.to_owned(), it.1.to_owned()))
                    .collect(),
            ))
        } else {
            Ok((
                line.len(),
                PRIMITIVES
                    .iter()
                    .filter(|it| it.starts_with(line))
                    .map(|it| it.split_at(line.len()).1)
                    .map(|it| CompleteCandidate::Prim(it.to_owned()))
                    .collect(),
            ))
        }
    }
}

impl Validator for REPLHelper {}

impl Hinter for REPLHelper {}

impl Highlighter for REPLHelper {}

impl REPL {
    fn new(cfg: Config) -> REPL {
        let history_file = dirs::home_dir()
            .map(|mut path| {
                path.push(".sf-history");
                path.to_str().map(|s| s.to_owned())
            })
            .flatten();

        let mut repl = REPL {
            rl: Editor::<REPLHelper>::new(),
            history_file,
            cfg,
            repl_run: true,
            prompt: "Sf> ".to_owned(),
            multiline: false,
            multiline_buffer: Vec::new(),
        };

        if let Some(ref path) = repl.history_file {
            let _ = repl.rl.load_history(path);
        }

        repl.rl.set_helper(Some(REPLHelper));
        repl
    }

    fn start(&mut self) {
        while self.repl_run {
            let readline = self.rl.readline(self.prompt.as_str());
            match readline {
                Ok(line) => {
                    if line.starts_with(":") {
                        self.process_command(line);
                        continue;
                    }

                    match self.multiline {
                        true => self.multiline_buffer.push(line),
                        _ => self.run_code(line),
                    }
                }

                Err(ReadlineError::Interrupted) => (),
                Err(ReadlineError::Eof) => {
                    break;
                }
                Err(err) => {
                    println!("ReadlineError: {:?}", err);
                    break;
                }
            }
        }
    }

    fn process_command(&mut self, line: String) {
        match line.as_str() {
            ":{" => {
                self.multiline = true;
                self.prompt = "Sf| ".to_owned();
            }

            ":}" => {
                self.multiline = false;
                self.prompt = "Sf> ".to_owned();
                let line = self.multiline_buffer.join("\n");
                self.multiline_buffer.clear();
                self.run_code(line);
            }

            ":q" => {
                self.repl_run = false;
            }

            ":prims" => {
                let mut prims: Vec<_> = PRIMITIVES.iter().collect();
                prims.sort();
                prims.iter().for_each(|p| println!("- {}", p));
            }

            _ => println!("Shell: Unknown command {}", line.as_str()),
        }
    }

    fn run_code(&mut self, line: String) {
        self.rl.add_history_entry(line.as_str());
        translate_and_print(&self.cfg, "<stdin>", line.as_str());
    }
}

impl Drop for REPL {
    fn drop(&mut self) {
        if let Some(ref path) = self.history_file {
            let _ = self.rl.save_history(path);
        }
    }
}

fn translate_and_print(cfg: &Config, file: &str, input: &str) {
    match Compiler::ast(input) {
        Ok(tree) => {
            if cfg.dump_ast {
                eprintln!("{:#?}", tree);
            }

            match JsCodeGenerator::new().codegen(tree) {
                Ok(js) => println!("{}", js),
                Err(err) => eprintln!("{}", err),
            }
        }
        Err(CompileError::Parse(e)) => eprintln!("{}", e.with_path(file)),
        Err(err) => eprintln!("{}", err),
    }
}

pub(crate) fn cli_main(cfg: Config, input: Option<String>) {
    if let Some(input) = input {
        let src = std::fs::read_to_string(input.as_str()).expect("unable to open file");
        translate_and_print(&cfg, input.as_str(), src.as_str());
    } else {
        let mut repl = REPL::new(cfg);
        repl.start();
    }
}
