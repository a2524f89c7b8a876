/// 程序配置文件
#[derive(Clone, Debug)]
pub struct Config {
    /// 数据目录（quiz.toml + attempts/ + files/）
    pub data_dir: String,
    /// 压缩包输出目录
    pub output_dir: String,
    /// 是否显示详细日志
    pub verbose_logging: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: "export_data".to_string(),
            output_dir: ".".to_string(),
            verbose_logging: false,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let default = Self::default();
        Self {
            data_dir: std::env::var("EXPORT_DATA_DIR").unwrap_or(default.data_dir),
            output_dir: std::env::var("EXPORT_OUTPUT_DIR").unwrap_or(default.output_dir),
            verbose_logging: std::env::var("VERBOSE_LOGGING").ok().and_then(|v| v.parse().ok()).unwrap_or(default.verbose_logging),
        }
    }
}
