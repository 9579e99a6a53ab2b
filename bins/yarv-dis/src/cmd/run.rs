use clap::Parser;

use crate::demos;

/// `run` subcommand.
#[derive(Parser, Debug)]
pub struct Cmd {
    /// Name of a built-in sample program.
    #[arg()]
    name: String,
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("unknown program {0:?}, available: {1:?}")]
    UnknownProgram(String, &'static [&'static str]),
    #[error(transparent)]
    Vm(#[from] yarv::VmError),
}

impl Cmd {
    pub fn run(&self) -> Result<(), Error> {
        let Some(iseq) = demos::build(&self.name) else {
            return Err(Error::UnknownProgram(self.name.clone(), demos::names()));
        };
        let value = yarv::eval(iseq)?;
        println!("{}", value.inspect());
        Ok(())
    }
}
