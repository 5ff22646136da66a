use std::{
    env, fs,
    net::{IpAddr, SocketAddr},
    path::Path,
    time::Duration,
};

use crate::{errors::Error, Result};

/// Typed configuration, read from the environment (and an optional `.env`).
#[derive(Clone, Debug)]
pub struct Config {
    // Telegram
    pub telegram_bot_token: String,
    /// Public base URL; webhook mode when set, long polling otherwise.
    pub webhook_base_url: Option<String>,
    pub listen_addr: SocketAddr,
    pub telegram_message_limit: usize,

    // Reddit OAuth (refresh-token grant)
    pub reddit_client_id: String,
    pub reddit_client_secret: String,
    pub reddit_refresh_token: String,
    pub reddit_user_agent: String,

    // Listing
    pub subreddit: String,
    pub listing_limit: usize,

    /// Upper bound for each content-source and messenger call.
    pub collaborator_timeout: Duration,
}

impl Config {
    pub fn load() -> Result<Self> {
        load_dotenv_if_present(Path::new(".env"));
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from an arbitrary key lookup (the process env in `load()`).
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let get = |key: &str| lookup(key).and_then(non_empty);
        let required = |key: &str| {
            get(key).ok_or_else(|| {
                Error::Config(format!("{key} environment variable is required"))
            })
        };

        let telegram_bot_token = required("TELEGRAM_BOT_TOKEN")?;
        let reddit_client_id = required("REDDIT_CLIENT_ID")?;
        let reddit_client_secret = required("REDDIT_CLIENT_SECRET")?;
        let reddit_refresh_token = required("REDDIT_REFRESH_TOKEN")?;

        // WEBHOOK_BASE_URL wins; VERCEL_URL is a bare host name.
        let webhook_base_url = get("WEBHOOK_BASE_URL")
            .or_else(|| get("VERCEL_URL").map(|host| format!("https://{host}")))
            .map(|url| url.trim_end_matches('/').to_string());

        let host = get("HOST").unwrap_or_else(|| "0.0.0.0".to_string());
        let host: IpAddr = host
            .trim()
            .parse()
            .map_err(|e| Error::Config(format!("invalid HOST {host:?}: {e}")))?;
        let port = parse_or("PORT", get("PORT"), 5000u16)?;
        let listen_addr = SocketAddr::new(host, port);

        let telegram_message_limit =
            parse_or("TELEGRAM_MESSAGE_LIMIT", get("TELEGRAM_MESSAGE_LIMIT"), 4096usize)?;

        let reddit_user_agent = get("REDDIT_USER_AGENT").unwrap_or_else(|| "fhb/0.1".to_string());
        let subreddit = get("SUBREDDIT").unwrap_or_else(|| "forhire".to_string());
        let listing_limit = parse_or("LISTING_LIMIT", get("LISTING_LIMIT"), 50usize)?;
        let collaborator_timeout = Duration::from_millis(parse_or(
            "COLLABORATOR_TIMEOUT_MS",
            get("COLLABORATOR_TIMEOUT_MS"),
            10_000u64,
        )?);

        Ok(Self {
            telegram_bot_token,
            webhook_base_url,
            listen_addr,
            telegram_message_limit,
            reddit_client_id,
            reddit_client_secret,
            reddit_refresh_token,
            reddit_user_agent,
            subreddit,
            listing_limit,
            collaborator_timeout,
        })
    }

    /// Full webhook URL, `<base>/webhook/<token>`.
    pub fn webhook_url(&self) -> Option<String> {
        self.webhook_base_url
            .as_ref()
            .map(|base| format!("{base}/webhook/{}", self.telegram_bot_token))
    }

    /// Prefix every acceptable post URL starts with.
    pub fn reference_prefix(&self) -> String {
        format!("https://www.reddit.com/r/{}/comments/", self.subreddit)
    }
}

fn parse_or<T>(key: &str, raw: Option<String>, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match raw {
        None => Ok(default),
        Some(s) => s
            .trim()
            .parse::<T>()
            .map_err(|e| Error::Config(format!("invalid {key} {s:?}: {e}"))),
    }
}

fn load_dotenv_if_present(path: &Path) {
    let Ok(contents) = fs::read_to_string(path) else {
        return;
    };

    for raw in contents.lines() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let Some((k, v)) = line.split_once('=') else {
            continue;
        };

        let key = k.trim();
        if key.is_empty() {
            continue;
        }
        if env::var_os(key).is_some() {
            continue; // do not override existing env
        }

        env::set_var(key, strip_quotes(v.trim()));
    }
}

fn strip_quotes(val: &str) -> &str {
    if val.len() >= 2
        && ((val.starts_with('"') && val.ends_with('"'))
            || (val.starts_with('\'') && val.ends_with('\'')))
    {
        return &val[1..val.len() - 1];
    }
    val
}

fn non_empty(s: String) -> Option<String> {
    if s.trim().is_empty() {
        None
    } else {
        Some(s)
    }
}
