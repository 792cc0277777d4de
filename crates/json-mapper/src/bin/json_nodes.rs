//! `json-nodes`: list the normalized nodes of a JSON document.
//!
//! Usage:
//!   json-nodes [--prefix <id-prefix>] [--config <file.toml>]
//!
//! The document is read from stdin; one tab-separated row per node
//! (id, path, type, value) is written to stdout.

use json_mapper::cli::{init_tracing, node_rows, parse_args};
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

    match node_rows(buf.trim(), &options) {
        Ok(rows) => {
            if let Err(e) = io::stdout().write_all(rows.as_bytes()) {
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
