use crate::commands::base_commands::Commands;
use crate::commands::context::CommandContext;
use crate::commands::monitor_error::MonitorError;

pub async fn login_command(ctx: &CommandContext, cmd: Commands) -> Result<(), MonitorError> {
    if let Commands::Login { username, password } = cmd {
        let session = ctx.session()?;
        let user = session.login(&username, &password, ctx.clock.now()).await?;
        println!("Logged in as {}", user.username);
    }
    Ok(())
}

pub async fn register_command(ctx: &CommandContext, cmd: Commands) -> Result<(), MonitorError> {
    if let Commands::Register { username, password } = cmd {
        ctx.session()?.register(&username, &password).await?;
        println!("Registered {username}, you can now log in");
    }
    Ok(())
}

pub fn logout_command(ctx: &CommandContext) -> Result<(), MonitorError> {
    ctx.local_session().logout()?;
    println!("Logged out");
    Ok(())
}
