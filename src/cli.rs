use crate::state::app_settings::{API_URL_VAR, AppSettings, LOG_VAR, SESSION_FILE_VAR};
use crate::state::session::{Provider, SessionContext, SessionStore};
use anyhow::Context;
use gonawin_api::SignedInUser;
use gonawin_api::client::GonawinApi;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Run,
    Help,
    Version,
    SignIn(SignIn),
    Logout,
}

/// Credentials handed back by a provider, or nothing yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignIn {
    Google { auth_token: Option<String> },
    Twitter { tokens: Option<(String, String)> },
    Facebook { access_token: String, id: String, name: String, email: String },
}

impl SignIn {
    fn provider(&self) -> Provider {
        match self {
            SignIn::Google { .. } => Provider::Google,
            SignIn::Twitter { .. } => Provider::Twitter,
            SignIn::Facebook { .. } => Provider::Facebook,
        }
    }
}

pub fn parse(args: &[String]) -> Result<Command, String> {
    let Some((first, rest)) = args.split_first() else {
        return Ok(Command::Run);
    };

    match first.as_str() {
        "-h" | "--help" => Ok(Command::Help),
        "-V" | "--version" => Ok(Command::Version),
        "logout" => Ok(Command::Logout),
        "signin" => parse_sign_in(rest).map(Command::SignIn),
        other => Err(format!("Unknown argument: {other}")),
    }
}

fn parse_sign_in(args: &[String]) -> Result<SignIn, String> {
    let Some((provider, rest)) = args.split_first() else {
        return Err("signin needs a provider: google, twitter or facebook".to_string());
    };
    let provider: Provider = provider.parse()?;

    match (provider, rest) {
        (Provider::Google, []) => Ok(SignIn::Google { auth_token: None }),
        (Provider::Google, [token]) => Ok(SignIn::Google { auth_token: Some(token.clone()) }),
        (Provider::Twitter, []) => Ok(SignIn::Twitter { tokens: None }),
        (Provider::Twitter, [token, verifier]) => {
            Ok(SignIn::Twitter { tokens: Some((token.clone(), verifier.clone())) })
        }
        (Provider::Facebook, [access_token, id, name, email]) => Ok(SignIn::Facebook {
            access_token: access_token.clone(),
            id: id.clone(),
            name: name.clone(),
            email: email.clone(),
        }),
        (provider, _) => Err(format!("wrong number of arguments for signin {provider}")),
    }
}

pub fn usage_text() -> String {
    format!(
        "gonawin - terminal client for the gonawin prediction game

Usage:
  gonawin
  gonawin signin google [<auth_token>]
  gonawin signin twitter [<oauth_token> <oauth_verifier>]
  gonawin signin facebook <access_token> <id> <name> <email>
  gonawin logout
  gonawin --help
  gonawin --version

Environment:
  {API_URL_VAR:<21}Backend base URL (default http://localhost:8080)
  {LOG_VAR:<21}Log level: error, warn, info, debug or trace
  {SESSION_FILE_VAR:<21}Where the session is kept"
    )
}

/// Complete a provider sign-in and store the session. Without credentials,
/// print the URL to visit instead.
pub async fn sign_in(settings: &AppSettings, request: SignIn) -> anyhow::Result<()> {
    let api = GonawinApi::new(settings.api_url.clone());
    let provider = request.provider();

    let (signed_in, access_token) = match request {
        SignIn::Google { auth_token: None } => {
            let url = api.fetch_google_login_url().await?;
            println!("Open this address, then run: gonawin signin google <auth_token>\n{url}");
            return Ok(());
        }
        SignIn::Twitter { tokens: None } => {
            let url = api.fetch_twitter_login_url().await?;
            println!(
                "Open this address, then run: gonawin signin twitter <oauth_token> <oauth_verifier>\n{url}"
            );
            return Ok(());
        }
        SignIn::Google { auth_token: Some(auth_token) } => {
            (api.fetch_google_user(&auth_token).await?, auth_token)
        }
        SignIn::Twitter { tokens: Some((token, verifier)) } => {
            (api.fetch_twitter_user(&token, &verifier).await?, token)
        }
        SignIn::Facebook { access_token, id, name, email } => {
            (api.fetch_facebook_user(&access_token, &id, &name, &email).await?, access_token)
        }
    };

    let SignedInUser { user, access_token: returned } = signed_in;
    let access_token = returned.filter(|t| !t.is_empty()).unwrap_or(access_token);
    let name = user.display_name().to_string();

    let mut session = SessionContext::init(SessionStore::new(&settings.session_file));
    session
        .sign_in(provider, access_token, user)
        .with_context(|| format!("signing in with {provider}"))?;
    println!("Signed in as {name}");
    Ok(())
}

pub async fn logout(settings: &AppSettings) -> anyhow::Result<()> {
    let mut session = SessionContext::init(SessionStore::new(&settings.session_file));
    if session.provider() == Some(Provider::Google) {
        let api = GonawinApi::new(settings.api_url.clone())
            .with_auth(session.auth().map(str::to_string));
        if let Err(e) = api.delete_google_cookie().await {
            log::warn!("could not delete the google cookie: {e}");
        }
    }
    session.teardown();
    println!("Signed out");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn no_arguments_runs_the_client() {
        assert_eq!(parse(&[]), Ok(Command::Run));
        assert_eq!(parse(&args(&["--version"])), Ok(Command::Version));
        assert_eq!(parse(&args(&["logout"])), Ok(Command::Logout));
    }

    #[test]
    fn sign_in_arguments_per_provider() {
        assert_eq!(
            parse(&args(&["signin", "Google"])),
            Ok(Command::SignIn(SignIn::Google { auth_token: None }))
        );
        assert_eq!(
            parse(&args(&["signin", "twitter", "tok", "ver"])),
            Ok(Command::SignIn(SignIn::Twitter {
                tokens: Some(("tok".to_string(), "ver".to_string()))
            }))
        );
        assert!(parse(&args(&["signin", "twitter", "tok"])).is_err());
        assert!(parse(&args(&["signin", "facebook", "tok"])).is_err());
        assert!(parse(&args(&["signin", "myspace"])).is_err());
        assert!(parse(&args(&["signin"])).is_err());
    }

    #[test]
    fn unknown_argument_is_rejected() {
        assert_eq!(parse(&args(&["--frobnicate"])), Err("Unknown argument: --frobnicate".into()));
    }

    #[test]
    fn usage_lists_environment() {
        let usage = usage_text();
        assert!(usage.contains(API_URL_VAR));
        assert!(usage.contains(SESSION_FILE_VAR));
    }
}
