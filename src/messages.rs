//! Operator-facing text.
//!
//! Every string the operator sees (display sentinels, notices, prompts sent
//! to the model) lives here in Chinese and English.

use serde::Deserialize;

/// Language of operator-facing text and of the model prompts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    #[default]
    Zh,
    En,
}

impl Locale {
    /// The literal answer the model gives when no identifier matches.
    pub fn no_match_sentinel(self) -> &'static str {
        match self {
            Locale::Zh => "未匹配",
            Locale::En => "no match",
        }
    }

    pub fn nothing_selected(self) -> &'static str {
        match self {
            Locale::Zh => "未选中行",
            Locale::En => "No row selected",
        }
    }

    pub fn no_name(self) -> &'static str {
        match self {
            Locale::Zh => "无姓名",
            Locale::En => "No name",
        }
    }

    pub fn extraction_started(self) -> &'static str {
        match self {
            Locale::Zh => "正在获取文件并呼叫 AI...",
            Locale::En => "Fetching the document and calling the model...",
        }
    }

    pub fn extraction_succeeded(self) -> &'static str {
        match self {
            Locale::Zh => "提取并填入成功！",
            Locale::En => "Identifier extracted and filled in.",
        }
    }

    pub fn extraction_no_match(self) -> &'static str {
        match self {
            Locale::Zh => "AI 未发现匹配信息",
            Locale::En => "The model found no matching identifier.",
        }
    }

    /// Prefix prepended to every error notice.
    pub fn error_prefix(self) -> &'static str {
        match self {
            Locale::Zh => "报错提示：",
            Locale::En => "Error: ",
        }
    }

    /// System instruction fixing the model's role.
    pub fn system_prompt(self) -> String {
        match self {
            Locale::Zh => format!(
                "你是一个证件提取专家，只需返回18位身份证号，不匹配则返回'{}'。",
                self.no_match_sentinel()
            ),
            Locale::En => format!(
                "You are a document extraction expert. Reply with the 18-digit national \
                 identifier only. If none applies, reply with '{}'. No explanations.",
                self.no_match_sentinel()
            ),
        }
    }

    /// Per-call instruction naming the subject.
    pub fn user_prompt(self, name: &str) -> String {
        match self {
            Locale::Zh => format!("请从文档中提取姓名是\"{name}\"的人的18位身份证号。不要解释说明。"),
            Locale::En => format!(
                "Extract the 18-digit national identifier of the person named \"{name}\" \
                 from the document. Do not explain."
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_locale_is_chinese() {
        assert_eq!(Locale::default(), Locale::Zh);
        assert_eq!(Locale::default().no_match_sentinel(), "未匹配");
    }

    #[test]
    fn test_prompts_mention_sentinel_and_name() {
        for locale in [Locale::Zh, Locale::En] {
            assert!(locale.system_prompt().contains(locale.no_match_sentinel()));
            assert!(locale.user_prompt("张三").contains("\"张三\""));
        }
    }

    #[test]
    fn test_deserialize_lowercase() {
        let locale: Locale = serde_yaml::from_str("en").unwrap();
        assert_eq!(locale, Locale::En);
    }
}
