pub mod disasm;
pub mod run;

use clap::Parser;

#[derive(Parser, Debug)]
#[command(infer_subcommands = true)]
pub enum MainCmd {
    /// Print the instruction listing of a built-in sample program.
    Disasm(disasm::Cmd),
    /// Evaluate a built-in sample program and print its result.
    Run(run::Cmd),
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Disasm(#[from] disasm::Error),
    #[error(transparent)]
    Run(#[from] run::Error),
}

impl MainCmd {
    pub fn run(&self) -> Result<(), Error> {
        match self {
            Self::Disasm(cmd) => cmd.run()?,
            Self::Run(cmd) => cmd.run()?,
        }
        Ok(())
    }
}
