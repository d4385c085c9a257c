//! A small CLI: evaluate a Jsonnet file and print the JSON.

#![deny(clippy::pedantic, missing_debug_implementations, rust_2018_idioms)]

use std::path::PathBuf;

fn main() {
  let logger_env = env_logger::Env::default().default_filter_or("info");
  env_logger::try_init_from_env(logger_env).expect("init logger");
  match run() {
    Ok(code) => std::process::exit(code),
    Err(e) => {
      eprintln!("sonnet: {e}");
      std::process::exit(2);
    }
  }
}

const HELP: &str = "\
sonnet: evaluate a Jsonnet file and print the JSON

usage:
  sonnet [options] FILE

options:
  -h, --help         show this help
  --max-depth NUM    evaluation recursion limit (default 500)
";

fn run() -> anyhow::Result<i32> {
  let mut args = pico_args::Arguments::from_env();
  if args.contains(["-h", "--help"]) {
    print!("{HELP}");
    return Ok(0);
  }
  let mut options = sonnet::Options::default();
  if let Some(max_depth) = args.opt_value_from_str::<_, usize>("--max-depth")? {
    options.max_depth = max_depth;
  }
  let file: PathBuf = args.free_from_str()?;
  let extra = args.finish();
  anyhow::ensure!(extra.is_empty(), "unexpected arguments: {extra:?}");
  log::info!("evaluating {}", file.display());
  let hook = sonnet::FsImportHook;
  let output = sonnet::evaluate_file(&file, &hook, options);
  match output.result {
    Ok(json) => {
      println!("{}", json.display());
      Ok(0)
    }
    Err(e) => {
      eprintln!("{}", e.display(&output.sources));
      Ok(1)
    }
  }
}
