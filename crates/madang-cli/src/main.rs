// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

mod config;
mod logging;
mod runtime;

use anyhow::{Context, Result, anyhow, bail};
use config::Config;
use madang_api::Client;
use madang_app::{Book, Customer, ListController, ListKind, LoginCandidate, Order};
use madang_store::{LoginGate, Session, Store};
use madang_tui::ScreenExit;
use runtime::ApiRuntime;
use std::env;
use std::path::PathBuf;
use std::time::Duration;

fn main() {
    if let Err(error) = run() {
        eprintln!("{error:#}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let options = parse_cli_args(env::args().skip(1), Config::default_path()?)?;
    if options.show_help {
        print_help();
        return Ok(());
    }

    if options.print_config_path {
        println!("{}", options.config_path.display());
        return Ok(());
    }

    if options.print_example {
        print!("{}", Config::example_config(&options.config_path));
        return Ok(());
    }

    let config = Config::load(&options.config_path).with_context(|| {
        format!(
            "load config {}; run `madang --print-example-config` to generate a v1 template",
            options.config_path.display()
        )
    })?;

    let log_path = config.log_path()?;
    let _log_guard = logging::init(&log_path, config.log_level()?)
        .with_context(|| format!("start logging to {}", log_path.display()))?;
    tracing::info!(config = %options.config_path.display(), "madang starting");

    let db_path = config.db_path()?;
    let store = Store::open(&db_path).with_context(|| {
        format!(
            "open database {} -- if this path is wrong, set [storage].db_path or MADANG_DB_PATH",
            db_path.display()
        )
    })?;
    store.bootstrap()?;

    let client = Client::new(config.base_url(), config.api_timeout()?).with_context(|| {
        format!(
            "invalid [api] config in {}; fix base_url/timeout values",
            options.config_path.display()
        )
    })?;

    if options.check_only {
        let health = client.health()?;
        if !health.is_up() {
            bail!(
                "{} reports status {:?}; expected UP",
                client.base_url(),
                health.status
            );
        }
        println!(
            "ok: {} {} at {}",
            health.service,
            health.version,
            client.base_url()
        );
        return Ok(());
    }

    let settings = ScreenSettings {
        page_size: config.page_size(),
        debounce: config.debounce()?,
    };
    let mut runtime = ApiRuntime::new(client, &store);
    let mut screen = options.screen.unwrap_or_else(|| config.start_screen());
    loop {
        match run_screen(screen, &settings, &store, &mut runtime)? {
            ScreenExit::Quit => break,
            ScreenExit::Switch(next) => {
                tracing::info!(from = screen.as_str(), to = next.as_str(), "switching screen");
                screen = next;
            }
        }
    }
    Ok(())
}

struct ScreenSettings {
    page_size: u32,
    debounce: Duration,
}

fn run_screen(
    kind: ListKind,
    settings: &ScreenSettings,
    store: &Store,
    runtime: &mut ApiRuntime<'_>,
) -> Result<ScreenExit> {
    let quiet = settings.debounce;
    match kind {
        ListKind::Books => madang_tui::run_app(
            runtime,
            ListController::<Book>::new(kind, settings.page_size),
            quiet,
        ),
        ListKind::Customers => madang_tui::run_app(
            runtime,
            ListController::<Customer>::new(kind, settings.page_size),
            quiet,
        ),
        ListKind::Login => madang_tui::run_app(
            runtime,
            ListController::<LoginCandidate>::new(kind, settings.page_size),
            quiet,
        ),
        ListKind::Orders => {
            let custid = match Session::new(store).require_login(Some(ListKind::Orders))? {
                LoginGate::Allowed(custid) => custid,
                LoginGate::LoginRequired => return Ok(ScreenExit::Switch(ListKind::Login)),
            };
            let controller = ListController::<Order>::new(kind, settings.page_size)
                .with_base_param("custid", custid.to_string());
            madang_tui::run_app(runtime, controller, quiet)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct CliOptions {
    config_path: PathBuf,
    screen: Option<ListKind>,
    print_config_path: bool,
    print_example: bool,
    check_only: bool,
    show_help: bool,
}

fn parse_cli_args<I, S>(args: I, default_config_path: PathBuf) -> Result<CliOptions>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut options = CliOptions {
        config_path: default_config_path,
        screen: None,
        print_config_path: false,
        print_example: false,
        check_only: false,
        show_help: false,
    };

    let mut iter = args.into_iter();
    while let Some(arg) = iter.next() {
        match arg.as_ref() {
            "--config" => {
                let value = iter
                    .next()
                    .ok_or_else(|| anyhow!("--config requires a file path"))?;
                options.config_path = PathBuf::from(value.as_ref());
            }
            "--screen" => {
                let value = iter.next().ok_or_else(|| {
                    anyhow!("--screen requires one of books, customers, orders, login")
                })?;
                let kind = ListKind::parse(value.as_ref()).ok_or_else(|| {
                    anyhow!(
                        "unknown screen {:?}; use books, customers, orders or login",
                        value.as_ref()
                    )
                })?;
                options.screen = Some(kind);
            }
            "--print-config-path" => {
                options.print_config_path = true;
            }
            "--print-example-config" => {
                options.print_example = true;
            }
            "--check" => {
                options.check_only = true;
            }
            "--help" | "-h" => {
                options.show_help = true;
            }
            unknown => {
                return Err(anyhow!(
                    "unknown argument {unknown:?}; run with --help to see supported options"
                ));
            }
        }
    }

    Ok(options)
}

fn print_help() {
    println!("madang");
    println!("  --config <path>          Use a specific config path");
    println!("  --screen <name>          Open books, customers, orders or login");
    println!("  --print-config-path      Print resolved config path");
    println!("  --print-example-config   Print a v1 config template");
    println!("  --check                  Validate config + store + server health");
    println!("  --help                   Show this help");
}
