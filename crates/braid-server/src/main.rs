use anyhow::Context;
use braid_core::{ServiceConfig, TimelineRequest, TimelineService};
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use std::net::SocketAddr;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

const DEFAULT_LOG_FILTER: &str = "braid=info,tower_http=info";

fn cli() -> Command {
    let config_arg = Arg::new("config")
        .long("config")
        .value_parser(value_parser!(PathBuf))
        .help("TOML configuration file");
    let data_root_arg = Arg::new("data-root")
        .long("data-root")
        .value_parser(value_parser!(PathBuf))
        .help("Directory holding chats/, groups/ and group chats/");

    Command::new("braid")
        .version(braid_server::VERSION)
        .about("Branching conversation timeline service")
        .subcommand_required(true)
        .arg(
            Arg::new("log-json")
                .long("log-json")
                .global(true)
                .action(ArgAction::SetTrue)
                .help("Emit logs as JSON lines"),
        )
        .subcommand(
            Command::new("serve")
                .about("Serve timelines over HTTP")
                .arg(config_arg.clone())
                .arg(data_root_arg.clone())
                .arg(
                    Arg::new("bind")
                        .long("bind")
                        .value_parser(value_parser!(SocketAddr))
                        .help("Listen address, e.g. 127.0.0.1:8000"),
                ),
        )
        .subcommand(
            Command::new("build")
                .about("Build one timeline and print its graph as JSON")
                .arg(Arg::new("subject").required(true).help("Character or group id"))
                .arg(
                    Arg::new("group")
                        .long("group")
                        .action(ArgAction::SetTrue)
                        .help("Subject is a group chat"),
                )
                .arg(config_arg)
                .arg(data_root_arg),
        )
}

async fn load_config(args: &ArgMatches) -> anyhow::Result<ServiceConfig> {
    let mut config = match args.get_one::<PathBuf>("config") {
        Some(path) => ServiceConfig::load(path)
            .await
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => ServiceConfig::default(),
    };
    if let Some(root) = args.get_one::<PathBuf>("data-root") {
        config = config.with_data_root(root);
    }
    if let Ok(Some(bind)) = args.try_get_one::<SocketAddr>("bind") {
        config = config.with_bind(*bind);
    }
    Ok(config)
}

async fn serve(config: ServiceConfig) -> anyhow::Result<()> {
    let app = braid_server::app(&config);
    let listener = tokio::net::TcpListener::bind(config.bind)
        .await
        .with_context(|| format!("binding {}", config.bind))?;

    tracing::info!(
        addr = %listener.local_addr()?,
        data_root = %config.data_root.display(),
        cache_ttl_secs = config.cache_ttl_secs,
        "braid listening"
    );
    axum::serve(listener, app).await?;
    Ok(())
}

async fn build(config: ServiceConfig, subject: &str, is_group: bool) -> anyhow::Result<()> {
    let service = TimelineService::from_config(&config);
    let request = TimelineRequest {
        subject: Some(subject.to_string()),
        is_group,
    };
    let timeline = service.timeline(&request).await?;
    println!("{}", serde_json::to_string_pretty(&timeline.graph)?);
    Ok(())
}

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    let subscriber = tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr);
    if json {
        subscriber.json().init();
    } else {
        subscriber.init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let matches = cli().get_matches();
    init_tracing(matches.get_flag("log-json"));

    match matches.subcommand() {
        Some(("serve", args)) => serve(load_config(args).await?).await,
        Some(("build", args)) => {
            let config = load_config(args).await?;
            let subject = args
                .get_one::<String>("subject")
                .context("subject is required")?;
            build(config, subject, args.get_flag("group")).await
        }
        _ => unreachable!("subcommand is required"),
    }
}
