use serde::Deserialize;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub tools: ToolsConfig,
    #[serde(default)]
    pub graph: GraphConfig,
    #[serde(default)]
    pub checksums: ChecksumsConfig,
}

/// Programs invoked on behalf of the user.
#[derive(Debug, Clone, Deserialize)]
pub struct ToolsConfig {
    #[serde(default = "default_port")]
    pub port: String,
    #[serde(default = "default_dot")]
    pub dot: String,
    #[serde(default = "default_sed")]
    pub sed: String,
    #[serde(default = "default_viewer")]
    pub viewer: String,
    /// Flags that make sed edit in place without keeping a backup.
    #[serde(default = "default_sed_in_place")]
    pub sed_in_place: Vec<String>,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            dot: default_dot(),
            sed: default_sed(),
            viewer: default_viewer(),
            sed_in_place: default_sed_in_place(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct GraphConfig {
    /// 0 walks the whole dependency graph.
    #[serde(default)]
    pub max_depth: usize,
    #[serde(default = "default_format")]
    pub format: String,
    #[serde(default = "default_open")]
    pub open: bool,
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            max_depth: 0,
            format: default_format(),
            open: default_open(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChecksumsConfig {
    #[serde(default)]
    pub missing_args: MissingArgs,
    #[serde(default = "default_isolate_failures")]
    pub isolate_failures: bool,
}

impl Default for ChecksumsConfig {
    fn default() -> Self {
        Self {
            missing_args: MissingArgs::default(),
            isolate_failures: default_isolate_failures(),
        }
    }
}

/// What `update-checksums` does when run without any port names.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MissingArgs {
    /// Print the usage line and exit successfully.
    #[default]
    Usage,
    /// Print the usage line and exit with a failure status.
    Error,
}

fn default_port() -> String {
    "port".to_string()
}

fn default_dot() -> String {
    "dot".to_string()
}

fn default_sed() -> String {
    "sed".to_string()
}

fn default_viewer() -> String {
    if cfg!(target_os = "macos") {
        "open".to_string()
    } else {
        "xdg-open".to_string()
    }
}

fn default_sed_in_place() -> Vec<String> {
    // BSD sed takes the backup suffix as a separate, here empty, argument.
    if cfg!(any(
        target_os = "macos",
        target_os = "freebsd",
        target_os = "openbsd",
        target_os = "netbsd"
    )) {
        vec!["-i".to_string(), String::new()]
    } else {
        vec!["-i".to_string()]
    }
}

fn default_format() -> String {
    "png".to_string()
}

fn default_open() -> bool {
    true
}

fn default_isolate_failures() -> bool {
    true
}
