use thiserror::Error;

/// 应用程序错误类型
#[derive(Debug, Error)]
pub enum AppError {
    /// 网络获取错误
    #[error("获取错误: {0}")]
    Fetch(#[from] FetchError),
    /// 总页数无法确定
    #[error("分页错误: {0}")]
    Pagination(#[from] PaginationError),
    /// 组装整本书失败
    #[error("组装错误: {0}")]
    Assembly(#[from] AssemblyError),
    /// 输出文件错误
    #[error("输出错误: {0}")]
    Output(#[from] OutputError),
    /// 配置错误
    #[error("配置错误: {0}")]
    Config(#[from] ConfigError),
}

/// 网络获取错误（单次尝试）
///
/// 全部属于可重试的瞬时错误
#[derive(Debug, Error)]
pub enum FetchError {
    /// 非 2xx 状态码
    #[error("HTTP 状态码 {status} ({url})")]
    Status { url: String, status: u16 },
    /// 请求超时
    #[error("请求超时 ({url})")]
    Timeout { url: String },
    /// 连接或读取失败
    #[error("请求失败 ({url}): {message}")]
    Transport { url: String, message: String },
}

/// 总页数无法确定
#[derive(Debug, Error)]
pub enum PaginationError {
    /// 第一页都拿不到
    #[error("无法获取第一页以确定总页数: {reason}")]
    FirstPageUnavailable { reason: String },
    /// 所有启发式策略都失败，且没有配置兜底页数
    #[error("无法确定总页数")]
    Undeterminable,
    /// 页数超过上限，页面标记不可信
    #[error("总页数 {total} 超过上限 {max}")]
    TooManyPages { total: u32, max: u32 },
}

/// 组装错误
#[derive(Debug, Error)]
pub enum AssemblyError {
    /// 每一页都失败或为空
    #[error("全部 {total_pages} 页都没有获取到内容")]
    NothingRetrieved { total_pages: u32 },
    /// 在派发任何页面之前就被取消
    #[error("操作已取消 (阶段: {stage})")]
    Cancelled { stage: &'static str },
}

/// 输出文件错误
#[derive(Debug, Error)]
pub enum OutputError {
    /// 内容为空，不写文件
    #[error("内容为空，未写入文件: {path}")]
    EmptyContent { path: String },
    /// 显示名称清理后为空，无法生成文件名
    #[error("无法从名称生成文件名: {name:?}")]
    InvalidFileName { name: String },
    /// 写入失败
    #[error("写入文件失败 ({path}): {source}")]
    WriteFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// 配置错误
#[derive(Debug, Error)]
pub enum ConfigError {
    /// 配置项取值非法
    #[error("配置项 {field} 非法: {reason}")]
    InvalidValue { field: &'static str, reason: String },
    /// 读取配置文件失败
    #[error("读取配置文件失败 ({path}): {source}")]
    ReadFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },
    /// TOML 解析失败
    #[error("TOML解析失败 ({path}): {source}")]
    TomlParseFailed {
        path: String,
        #[source]
        source: toml::de::Error,
    },
    /// 构建 HTTP 客户端失败
    #[error("构建 HTTP 客户端失败: {0}")]
    HttpClient(String),
}

// ========== 便捷构造函数 ==========

impl ConfigError {
    pub fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        ConfigError::InvalidValue {
            field,
            reason: reason.into(),
        }
    }
}

// ========== Result 类型别名 ==========

/// 应用程序结果类型
pub type AppResult<T> = Result<T, AppError>;
