//! Token management: `dramp login` / `dramp logout`.

use std::io::{self, Write};

use dataramp_config::{auth_file_path, delete_auth, save_auth, AuthCredentials};

use crate::exit_codes::EXIT_ERROR;
use crate::CliError;

pub fn cmd_login(token: Option<String>, user: Option<String>) -> Result<(), CliError> {
    // Resolve token: --token flag > DATARAMP_TOKEN env > interactive prompt
    let token = if let Some(t) = token {
        t
    } else if let Ok(t) = std::env::var("DATARAMP_TOKEN") {
        t
    } else if atty::is(atty::Stream::Stdin) {
        eprint!("Console API token: ");
        io::stderr().flush().ok();
        let mut buf = String::new();
        io::stdin().read_line(&mut buf).map_err(|e| CliError {
            code: EXIT_ERROR,
            message: e.to_string(),
            hint: None,
        })?;
        let trimmed = buf.trim().to_string();
        if trimmed.is_empty() {
            return Err(CliError::usage(
                "No token provided",
                Some("pass --token or set DATARAMP_TOKEN".into()),
            ));
        }
        trimmed
    } else {
        return Err(CliError::usage(
            "No token provided and stdin is not a TTY",
            Some("pass --token or set DATARAMP_TOKEN".into()),
        ));
    };

    let creds = AuthCredentials {
        token,
        api_base: None,
        user,
    };
    save_auth(&creds).map_err(|e| CliError {
        code: EXIT_ERROR,
        message: e,
        hint: None,
    })?;

    if let Some(path) = auth_file_path() {
        eprintln!("Token saved to {}", path.display());
    }
    Ok(())
}

pub fn cmd_logout() -> Result<(), CliError> {
    delete_auth().map_err(|e| CliError {
        code: EXIT_ERROR,
        message: e,
        hint: None,
    })?;
    eprintln!("Logged out");
    Ok(())
}
