use clap::Parser;
use serde::Serialize;
use std::sync::Arc;

use anemone::{
    expand_string, Completion, ExpandContext, ExpandFlags, ExpandResult, FsMatcher, OsFs,
    ParseErrorList, UserTable, VarTable, VariableStore,
};

#[derive(Parser)]
#[command(name = "anemone")]
#[command(about = "Expand shell argument tokens against the live environment")]
#[command(version)]
struct Cli {
    /// Produce completion candidates instead of execution arguments
    #[arg(short = 'c', long = "complete")]
    complete: bool,

    /// Leave $variables unexpanded
    #[arg(long = "skip-variables")]
    skip_variables: bool,

    /// Treat wildcard characters literally
    #[arg(long = "skip-wildcards")]
    skip_wildcards: bool,

    /// Search CDPATH the way cd would
    #[arg(long = "cd")]
    special_for_cd: bool,

    /// Search PATH the way command resolution would
    #[arg(long = "command")]
    special_for_command: bool,

    /// Output results as JSON
    #[arg(long = "json")]
    json: bool,

    /// Tokens to expand
    #[arg(required = true)]
    tokens: Vec<String>,
}

#[derive(Serialize)]
struct TokenReport {
    token: String,
    result: &'static str,
    completions: Vec<CompletionReport>,
    errors: Vec<String>,
}

#[derive(Serialize)]
struct CompletionReport {
    text: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    description: String,
    replaces_token: bool,
}

fn result_name(result: ExpandResult) -> &'static str {
    match result {
        ExpandResult::Ok => "ok",
        ExpandResult::WildcardMatch => "wildcard-match",
        ExpandResult::WildcardNoMatch => "no-match",
        ExpandResult::Error => "error",
    }
}

/// Variables from the process environment. PATH-like values arrive as one
/// colon-joined string and are split back into lists.
fn live_vars() -> VarTable {
    let mut vars = VarTable::new();
    for (name, value) in std::env::vars() {
        if matches!(name.as_str(), "PATH" | "CDPATH" | "MANPATH") {
            vars.set(&name, value.split(':').map(String::from));
        } else {
            vars.set_one(&name, value);
        }
    }
    if vars.get("PWD").is_none() {
        if let Ok(cwd) = std::env::current_dir() {
            vars.set_one("PWD", cwd.to_string_lossy());
        }
    }
    vars
}

/// Usernames and home directories from the system user database.
fn live_users() -> UserTable {
    let mut users = UserTable::new();
    if let Ok(passwd) = std::fs::read_to_string("/etc/passwd") {
        for line in passwd.lines() {
            let fields: Vec<&str> = line.split(':').collect();
            if fields.len() >= 6 && !fields[0].is_empty() {
                users.insert(fields[0], fields[5]);
            }
        }
    }
    users
}

fn main() {
    let cli = Cli::parse();

    let vars = live_vars();
    let users = live_users();
    let matcher = FsMatcher::new(Arc::new(OsFs));
    let ctx = ExpandContext::new(&vars, &users, &matcher);

    // No subshell collaborator is wired in: this binary never launches
    // processes, so substitutions are rejected rather than evaluated.
    let flags = ExpandFlags {
        for_completions: cli.complete,
        skip_cmdsubst: true,
        skip_variables: cli.skip_variables,
        skip_wildcards: cli.skip_wildcards,
        special_for_cd: cli.special_for_cd,
        special_for_command: cli.special_for_command,
        ..Default::default()
    };

    let mut reports = Vec::new();
    let mut exit_code = 0;
    for token in &cli.tokens {
        let mut completions: Vec<Completion> = Vec::new();
        let mut errors = ParseErrorList::new();
        let result = expand_string(token, &mut completions, flags, &ctx, Some(&mut errors));
        exit_code = exit_code.max(match result {
            ExpandResult::Ok | ExpandResult::WildcardMatch => 0,
            ExpandResult::WildcardNoMatch => 1,
            ExpandResult::Error => 2,
        });
        if cli.json {
            reports.push(TokenReport {
                token: token.clone(),
                result: result_name(result),
                completions: completions
                    .into_iter()
                    .map(|c| CompletionReport {
                        text: c.text,
                        description: c.description,
                        replaces_token: c.flags.replaces_token,
                    })
                    .collect(),
                errors: errors.iter().map(|e| e.text.clone()).collect(),
            });
        } else {
            for completion in &completions {
                println!("{}", completion.text);
            }
            for error in errors.iter() {
                eprintln!("anemone: {}", error);
            }
        }
    }

    if cli.json {
        match serde_json::to_string_pretty(&reports) {
            Ok(rendered) => println!("{}", rendered),
            Err(e) => {
                eprintln!("anemone: cannot render JSON: {}", e);
                exit_code = exit_code.max(2);
            }
        }
    }
    std::process::exit(exit_code);
}
