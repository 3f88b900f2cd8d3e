use clap::{Args, Subcommand};

pub mod download;
pub mod ls;
pub mod rm;
pub mod upload;

use crate::cli::op::Op;

crate::command_enum! {
    (Upload, upload::Upload),
    (Ls, ls::Ls),
    (Rm, rm::Rm),
    (Download, download::Download),
}

// Rename the generated Command to VaultCommand for clarity
pub type VaultCommand = Command;

#[derive(Args, Debug, Clone)]
pub struct Vault {
    #[command(subcommand)]
    pub command: VaultCommand,
}

#[async_trait::async_trait]
impl Op for Vault {
    type Error = OpError;
    type Output = OpOutput;

    async fn execute(&self, ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        self.command.execute(ctx).await
    }
}
