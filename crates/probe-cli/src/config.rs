use crate::error::ConfigError;
use facet::Facet;
use figue as args;
use std::time::Duration;

/// Raw CLI shape, parsed by figue straight off `std::env::args`. Field
/// polarity follows the source codebase's own convention of `no_x` flags for
/// things that default to enabled, rather than a `Default` impl that
/// disagrees with the flag's absence.
#[derive(Facet, Debug)]
pub struct Cli {
    #[facet(flatten)]
    pub builtins: args::FigueBuiltins,

    #[facet(args::named, default)]
    pub publish_interval_ms: Option<u64>,
    #[facet(args::named, default)]
    pub spy_interval_ms: Option<u64>,
    #[facet(args::named, default)]
    pub docker: bool,
    #[facet(args::named, default)]
    pub docker_interval_ms: Option<u64>,
    #[facet(args::named, default)]
    pub docker_bridge: Option<String>,
    #[facet(args::named, default)]
    pub weave_router_addr: Option<String>,
    #[facet(args::named, default)]
    pub kubernetes_api: Option<String>,
    #[facet(args::named, default)]
    pub no_processes: bool,
    #[facet(args::named, default)]
    pub capture: bool,
    #[facet(args::named, default)]
    pub token: Option<String>,
    #[facet(args::named, default)]
    pub http_listen: Option<String>,
    #[facet(args::positional, default)]
    pub targets: Vec<String>,
}

fn parse_cli() -> Result<Cli, String> {
    let figue_config = args::builder::<Cli>()
        .map_err(|e| format!("failed to build CLI schema: {e}"))?
        .cli(|cli| cli.strict())
        .help(|h| {
            h.program_name("probe")
                .description("infrastructure-observability probe")
                .version(option_env!("CARGO_PKG_VERSION").unwrap_or("dev"))
        })
        .build();

    args::Driver::new(figue_config)
        .run()
        .into_result()
        .map(|v| v.value)
        .map_err(|e| e.to_string())
}

/// Typed, validated configuration the rest of the process wiring consumes.
/// Defaults match the CLI flag table; validation happens once, here.
#[derive(Debug, Clone)]
pub struct ProbeConfig {
    pub scope: String,
    pub publish_interval: Duration,
    pub spy_interval: Duration,
    pub docker: bool,
    pub docker_interval: Duration,
    pub docker_bridge: String,
    pub weave_router_addr: Option<String>,
    pub kubernetes_api: Option<String>,
    pub processes: bool,
    pub capture: bool,
    pub token: Option<String>,
    pub http_listen: Option<String>,
    pub targets: Vec<String>,
}

/// The subset of [`Cli`] that validation actually depends on, with the
/// figue-specific `builtins` field stripped out. Keeping validation over
/// this plain struct means it can be exercised directly in tests without
/// constructing a `FigueBuiltins`.
struct RawArgs {
    publish_interval_ms: Option<u64>,
    spy_interval_ms: Option<u64>,
    docker: bool,
    docker_interval_ms: Option<u64>,
    docker_bridge: Option<String>,
    weave_router_addr: Option<String>,
    kubernetes_api: Option<String>,
    no_processes: bool,
    capture: bool,
    token: Option<String>,
    http_listen: Option<String>,
    targets: Vec<String>,
}

impl From<Cli> for RawArgs {
    fn from(cli: Cli) -> Self {
        Self {
            publish_interval_ms: cli.publish_interval_ms,
            spy_interval_ms: cli.spy_interval_ms,
            docker: cli.docker,
            docker_interval_ms: cli.docker_interval_ms,
            docker_bridge: cli.docker_bridge,
            weave_router_addr: cli.weave_router_addr,
            kubernetes_api: cli.kubernetes_api,
            no_processes: cli.no_processes,
            capture: cli.capture,
            token: cli.token,
            http_listen: cli.http_listen,
            targets: cli.targets,
        }
    }
}

impl ProbeConfig {
    pub fn parse() -> Result<Self, ConfigError> {
        let cli = parse_cli().unwrap_or_else(|err| {
            eprintln!("{err}");
            std::process::exit(1);
        });
        Self::from_raw(cli.into())
    }

    fn from_raw(args: RawArgs) -> Result<Self, ConfigError> {
        let docker_bridge = args.docker_bridge.unwrap_or_else(|| "docker0".to_string());
        if args.docker && docker_bridge.trim().is_empty() {
            return Err(ConfigError::InvalidDockerBridge);
        }

        let publish_interval = Duration::from_millis(args.publish_interval_ms.unwrap_or(3_000));
        let spy_interval = Duration::from_millis(args.spy_interval_ms.unwrap_or(1_000));
        if publish_interval < spy_interval {
            tracing::warn!(
                publish_interval_ms = publish_interval.as_millis() as u64,
                spy_interval_ms = spy_interval.as_millis() as u64,
                "publish.interval is shorter than spy.interval; every publish will carry at most one spy tick's worth of data"
            );
        }

        let targets = if args.targets.is_empty() {
            vec!["localhost".to_string()]
        } else {
            args.targets
        };

        Ok(Self {
            scope: default_scope(),
            publish_interval,
            spy_interval,
            docker: args.docker,
            docker_interval: Duration::from_millis(args.docker_interval_ms.unwrap_or(10_000)),
            docker_bridge,
            weave_router_addr: args.weave_router_addr.filter(|s| !s.is_empty()),
            kubernetes_api: args.kubernetes_api.filter(|s| !s.is_empty()),
            processes: !args.no_processes,
            capture: args.capture,
            token: args.token.filter(|s| !s.is_empty()),
            http_listen: args.http_listen.filter(|s| !s.is_empty()),
            targets,
        })
    }
}

/// The probe's scope prefix. Defaults to empty, matching the source
/// codebase's own default of scoping node ids by hostname alone with no
/// separate prefix; there is currently no CLI flag to override it.
fn default_scope() -> String {
    String::new()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(targets: Vec<&str>) -> RawArgs {
        RawArgs {
            publish_interval_ms: None,
            spy_interval_ms: None,
            docker: false,
            docker_interval_ms: None,
            docker_bridge: None,
            weave_router_addr: None,
            kubernetes_api: None,
            no_processes: false,
            capture: false,
            token: None,
            http_listen: None,
            targets: targets.into_iter().map(String::from).collect(),
        }
    }

    #[test]
    fn empty_targets_default_to_localhost() {
        let cfg = ProbeConfig::from_raw(args(vec![])).unwrap();
        assert_eq!(cfg.targets, vec!["localhost".to_string()]);
    }

    #[test]
    fn docker_enabled_with_empty_bridge_is_rejected() {
        let mut a = args(vec![]);
        a.docker = true;
        a.docker_bridge = Some(String::new());
        assert!(matches!(ProbeConfig::from_raw(a), Err(ConfigError::InvalidDockerBridge)));
    }

    #[test]
    fn no_processes_flag_disables_processes() {
        let mut a = args(vec![]);
        a.no_processes = true;
        let cfg = ProbeConfig::from_raw(a).unwrap();
        assert!(!cfg.processes);
    }

    #[test]
    fn default_scope_is_empty() {
        let cfg = ProbeConfig::from_raw(args(vec![])).unwrap();
        assert_eq!(cfg.scope, "");
    }
}
