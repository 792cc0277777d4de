//! `json-mapping`: re-resolve an exported mapping document.
//!
//! Usage:
//!   json-mapping [--config <file.toml>]
//!
//! The exported document is read from stdin, imported, and written back
//! to stdout. Mappings whose paths no longer resolve are dropped and
//! logged as warnings on stderr.

use json_mapper::cli::{init_tracing, parse_args, remap_export};
use std::io::{self, Read, Write};

fn main() {
    init_tracing();
    let args: Vec<String> = std::env::args().skip(1).collect();
    let options = match parse_args(&args) {
        Ok(options) => options,
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(1);
        }
    };

    let mut buf = String::new();
    if let Err(e) = io::stdin().read_to_string(&mut buf) {
        eprintln!("{e}");
        std::process::exit(1);
    }

    match remap_export(&buf, &options) {
        Ok(doc) => {
            let mut stdout = io::stdout();
            if let Err(e) = stdout
                .write_all(doc.as_bytes())
                .and_then(|()| stdout.write_all(b"\n"))
            {
                eprintln!("{e}");
                std::process::exit(1);
            }
        }
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(1);
        }
    }
}
