//! 提交请求模型
//!
//! 后端的处理参数不固定，这里用"参数名 -> 标量值"的有序集合表示

use std::fmt::Display;

/// 元数据路径字段名
pub const METADATA_FIELD: &str = "metadata_path";

/// 标量参数值
///
/// 以纯文本形式发送：浮点数和布尔值直接转字符串，不做 JSON 编码
#[derive(Debug, Clone, PartialEq)]
pub enum ParamValue {
    Float(f64),
    Int(i64),
    Bool(bool),
    Text(String),
}

impl Display for ParamValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ParamValue::Float(v) => write!(f, "{}", v),
            ParamValue::Int(v) => write!(f, "{}", v),
            ParamValue::Bool(v) => write!(f, "{}", v),
            ParamValue::Text(v) => write!(f, "{}", v),
        }
    }
}

impl From<f64> for ParamValue {
    fn from(v: f64) -> Self {
        ParamValue::Float(v)
    }
}

impl From<i64> for ParamValue {
    fn from(v: i64) -> Self {
        ParamValue::Int(v)
    }
}

impl From<bool> for ParamValue {
    fn from(v: bool) -> Self {
        ParamValue::Bool(v)
    }
}

impl From<&str> for ParamValue {
    fn from(v: &str) -> Self {
        ParamValue::Text(v.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(v: String) -> Self {
        ParamValue::Text(v)
    }
}

/// 随照片一起发送给后端的参数
#[derive(Debug, Clone, PartialEq)]
pub struct SubmissionRequest {
    /// 后端用来定位答题卡布局元数据的路径
    pub metadata_reference: String,
    params: Vec<(String, ParamValue)>,
}

impl SubmissionRequest {
    /// 只有元数据路径、没有处理参数的请求
    pub fn new(metadata_reference: impl Into<String>) -> Self {
        Self {
            metadata_reference: metadata_reference.into(),
            params: Vec::new(),
        }
    }

    /// 阈值对方案
    pub fn thresholds(metadata_reference: impl Into<String>) -> Self {
        Self::new(metadata_reference)
            .with_param("marked_threshold", 0.26)
            .with_param("unmarked_threshold", 0.10)
            .with_param("px_per_mm", 10.0)
    }

    /// 模式开关方案
    pub fn robust(metadata_reference: impl Into<String>) -> Self {
        Self::new(metadata_reference)
            .with_param("px_per_mm", 10.0)
            .with_param("robust_mode", true)
            .with_param("save_debug_artifacts", true)
    }

    pub fn with_param(mut self, name: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        self.set_param(name, value);
        self
    }

    /// 设置参数，同名参数原位覆盖
    pub fn set_param(&mut self, name: impl Into<String>, value: impl Into<ParamValue>) {
        let name = name.into();
        let value = value.into();
        match self.params.iter_mut().find(|(n, _)| *n == name) {
            Some((_, existing)) => *existing = value,
            None => self.params.push((name, value)),
        }
    }

    pub fn remove_param(&mut self, name: &str) -> Option<ParamValue> {
        let index = self.params.iter().position(|(n, _)| n == name)?;
        Some(self.params.remove(index).1)
    }

    pub fn param(&self, name: &str) -> Option<&ParamValue> {
        self.params.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    pub fn params(&self) -> &[(String, ParamValue)] {
        &self.params
    }

    /// 所有文本字段（元数据路径在前），值已转为字符串
    pub fn text_fields(&self) -> Vec<(String, String)> {
        std::iter::once((METADATA_FIELD.to_string(), self.metadata_reference.clone()))
            .chain(
                self.params
                    .iter()
                    .filter(|(name, _)| name != METADATA_FIELD)
                    .map(|(name, value)| (name.clone(), value.to_string())),
            )
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_param_stringification() {
        assert_eq!(ParamValue::from(0.26).to_string(), "0.26");
        assert_eq!(ParamValue::from(0.10).to_string(), "0.1");
        assert_eq!(ParamValue::from(10.0).to_string(), "10");
        assert_eq!(ParamValue::from(true).to_string(), "true");
        assert_eq!(ParamValue::from(false).to_string(), "false");
        assert_eq!(ParamValue::from(3_i64).to_string(), "3");
    }

    #[test]
    fn test_thresholds_fields() {
        let request = SubmissionRequest::thresholds("layout.json");
        assert_eq!(
            request.text_fields(),
            vec![
                ("metadata_path".to_string(), "layout.json".to_string()),
                ("marked_threshold".to_string(), "0.26".to_string()),
                ("unmarked_threshold".to_string(), "0.1".to_string()),
                ("px_per_mm".to_string(), "10".to_string()),
            ]
        );
    }

    #[test]
    fn test_robust_fields() {
        let request = SubmissionRequest::robust("layout.json");
        let fields = request.text_fields();
        assert_eq!(fields.len(), 4);
        assert_eq!(fields[2], ("robust_mode".to_string(), "true".to_string()));
        assert_eq!(fields[3], ("save_debug_artifacts".to_string(), "true".to_string()));
    }

    #[test]
    fn test_set_param_overrides_in_place() {
        let mut request = SubmissionRequest::thresholds("m");
        request.set_param("marked_threshold", 0.3);
        request.set_param("extra_flag", false);
        assert_eq!(request.param("marked_threshold"), Some(&ParamValue::Float(0.3)));
        assert_eq!(request.params()[0].0, "marked_threshold");
        assert_eq!(request.params().last().map(|(n, _)| n.as_str()), Some("extra_flag"));

        assert_eq!(request.remove_param("extra_flag"), Some(ParamValue::Bool(false)));
        assert!(request.param("extra_flag").is_none());
    }

    #[test]
    fn test_metadata_param_not_duplicated() {
        let request = SubmissionRequest::new("real.json").with_param("metadata_path", "shadow.json");
        let fields = request.text_fields();
        assert_eq!(fields, vec![("metadata_path".to_string(), "real.json".to_string())]);
    }
}
