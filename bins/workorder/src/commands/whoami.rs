//! Current user command

use crate::context::{AppContext, ENV_EMAIL, ENV_PASSWORD};
use anyhow::{bail, Result};
use workorder_api_client::SessionProvider;
use workorder_cli::Status;

pub async fn run(ctx: &AppContext) -> Result<()> {
    ctx.sign_in().await?;

    let session = ctx.session().get_session().await.ok().flatten();
    let Some(session) = session else {
        bail!("not signed in; set {ENV_EMAIL} and {ENV_PASSWORD}");
    };

    let profile = ctx.client().auth().me().await?;
    ctx.emit(&profile, || {
        let email = profile
            .get("email")
            .and_then(|v| v.as_str())
            .or_else(|| session.user.as_ref().and_then(|u| u.email.as_deref()))
            .unwrap_or("unknown");
        Status::success(&format!("Signed in as {email}"));
        if let Some(id) = profile.get("id").and_then(|v| v.as_str()) {
            println!("  User ID: {id}");
        }
    })
}
