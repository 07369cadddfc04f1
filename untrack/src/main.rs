use std::error::Error;
use std::process;

use tracing::Level;
use untrack as ut;
use ut::output;

fn main() {
    let opts = match ut::opts::parse_args() {
        Ok(opts) => opts,
        Err(err) => {
            output::error(&err.to_string());
            process::exit(2);
        }
    };

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(if opts.debug_mode { Level::DEBUG } else { Level::WARN })
        .init();
    output::set_quiet(opts.quiet);

    if let Err(err) = ut::run(&opts) {
        output::error(&err.to_string());
        let mut source = err.source();
        while let Some(cause) = source {
            eprintln!("Caused by: {cause}");
            source = cause.source();
        }
        let code = match err {
            ut::Error::InvalidOptions(_) | ut::Error::Config { .. } => 2,
            _ => 1,
        };
        process::exit(code);
    }
}
