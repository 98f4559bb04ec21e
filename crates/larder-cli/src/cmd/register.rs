//! `ldr register` — create an account.

use super::CmdContext;
use crate::output::render_success;
use anyhow::Result;
use clap::Args;
use larder_core::db::users;
use larder_core::hash::SaltedSha256;
use larder_core::model::Registration;

#[derive(Args, Debug)]
pub struct RegisterArgs {
    /// Unique login id.
    #[arg(long)]
    pub login: String,

    /// Unique display name.
    #[arg(long)]
    pub username: String,

    /// Account password.
    #[arg(long)]
    pub password: String,

    /// Password confirmation (must match).
    #[arg(long)]
    pub confirm: String,
}

pub fn run_register(args: &RegisterArgs, ctx: &CmdContext) -> Result<()> {
    let mut conn = ctx.open_existing_store()?;
    let user = users::register(
        &mut conn,
        &Registration {
            login_id: args.login.clone(),
            username: args.username.clone(),
            password: args.password.clone(),
            password_confirm: args.confirm.clone(),
        },
        &SaltedSha256,
    )?;
    render_success(
        ctx.output,
        &format!("Registered {} (user id {})", user.login_id, user.user_id),
    )
}

#[cfg(test)]
mod tests {
    use super::RegisterArgs;
    use clap::Parser;

    #[derive(Parser)]
    struct Wrapper {
        #[command(flatten)]
        args: RegisterArgs,
    }

    #[test]
    fn all_fields_are_required() {
        let parsed = Wrapper::try_parse_from([
            "test", "--login", "alice", "--username", "Alice", "--password", "pw", "--confirm",
            "pw",
        ])
        .expect("full invocation parses");
        assert_eq!(parsed.args.login, "alice");

        assert!(Wrapper::try_parse_from(["test", "--login", "alice"]).is_err());
    }
}
