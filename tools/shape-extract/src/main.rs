//! shape-extract: print the canonical shape of a slow-query document
//!
//! Usage:
//!   shape-extract '<query text>'   # shape of one loose query document
//!   shape-extract -                # read the query text from stdin
//!
//! Prints the shape string on success. When the text cannot be canonicalized
//! the raw input is echoed back and the exit code is 1, mirroring the
//! engine's fallback behavior. Use it to check what fingerprint a log line's
//! query will group under.

use std::env;
use std::io::{self, Read};
use std::process;

use slowquery_engine::canonical::Canonicalizer;
use slowquery_engine::shape;

fn main() {
    let args: Vec<String> = env::args().skip(1).collect();
    let [arg] = args.as_slice() else {
        eprintln!("usage: shape-extract '<query text>' | shape-extract -");
        process::exit(2);
    };

    let text = if arg == "-" {
        let mut buf = String::new();
        if let Err(e) = io::stdin().read_to_string(&mut buf) {
            eprintln!("shape-extract: cannot read stdin: {}", e);
            process::exit(2);
        }
        buf.trim().to_string()
    } else {
        arg.clone()
    };

    match Canonicalizer::new().canonicalize(&text) {
        Ok(doc) => println!("{}", shape::shape_of(&doc)),
        Err(err) => {
            eprintln!("shape-extract: cannot canonicalize: {}", err);
            println!("{}", text);
            process::exit(1);
        }
    }
}
