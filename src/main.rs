use std::{fs::File, io::{self, BufRead, BufReader}};

use silly::{parse_statement, EvaluationContext, TokenStream};

// Executes one statement at a time, reporting failures and moving on.
// A syntax error ends the run since the stream cannot be resynchronized.
fn run<R: BufRead>(mut tokens: TokenStream<R>, echo: bool) -> anyhow::Result<()> {
    let mut context = EvaluationContext::new();

    while tokens.has_next()? {
        let statement = match parse_statement(&mut tokens) {
            Ok(statement) => statement,
            Err(err) => {
                println!("{}", err);
                break;
            }
        };
        if echo {
            println!("{}", statement);
        }
        if let Err(err) = context.execute(&statement) {
            println!("{}", err);
        }
    }

    Ok(())
}

fn main() -> anyhow::Result<()> {
    match std::env::args().nth(1) {
        Some(path) => run(TokenStream::new(BufReader::new(File::open(path)?)), true),
        None => run(TokenStream::new(io::stdin().lock()), false),
    }
}
