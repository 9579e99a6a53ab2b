mod cmd;
mod demos;

use clap::Parser;

fn main() {
    let cmd = cmd::MainCmd::parse();
    if let Err(err) = cmd.run() {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}
