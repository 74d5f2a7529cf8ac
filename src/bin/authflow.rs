use anyhow::Result;
use authflow::cli::{actions, actions::Action, start};

// Main function
#[tokio::main]
async fn main() -> Result<()> {
    // Start the program
    let action = start()?;

    // Handle the action
    match action {
        Action::Session(args) => actions::session::execute(args).await?,
        Action::Strength(args) => actions::strength::execute(&args)?,
    }

    Ok(())
}
