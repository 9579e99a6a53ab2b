use clap::Parser;

use crate::demos;

/// `disasm` subcommand.
#[derive(Parser, Debug)]
pub struct Cmd {
    /// Name of a built-in sample program. Omit to list the available names.
    #[arg()]
    name: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("unknown program {0:?}, available: {1:?}")]
    UnknownProgram(String, &'static [&'static str]),
}

impl Cmd {
    pub fn run(&self) -> Result<(), Error> {
        let Some(name) = &self.name else {
            for name in demos::names() {
                println!("{name}");
            }
            return Ok(());
        };
        let Some(iseq) = demos::build(name) else {
            return Err(Error::UnknownProgram(name.clone(), demos::names()));
        };
        print!("{}", yarv::disassemble(&iseq));
        Ok(())
    }
}
