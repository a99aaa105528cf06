//! Birth-data intake form: validation, display labels and prompt composition

use minijinja::{Environment, context};
use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// The twelve traditional double-hour slots, keyed by the form's time code.
const TIME_SLOT_LABELS: [(&str, &str); 12] = [
    ("23:00", "子时 (23:00-01:00)"),
    ("01:00", "丑时 (01:00-03:00)"),
    ("03:00", "寅时 (03:00-05:00)"),
    ("05:00", "卯时 (05:00-07:00)"),
    ("07:00", "辰时 (07:00-09:00)"),
    ("09:00", "巳时 (09:00-11:00)"),
    ("11:00", "午时 (11:00-13:00)"),
    ("13:00", "未时 (13:00-15:00)"),
    ("15:00", "申时 (15:00-17:00)"),
    ("17:00", "酉时 (17:00-19:00)"),
    ("19:00", "戌时 (19:00-21:00)"),
    ("21:00", "亥时 (21:00-23:00)"),
];

const ECHO_TEMPLATE: &str = "快速八字分析请求：出生日期: {{ birth_date }}, 出生时间: {{ time_label }}, 性别: {{ gender_label }}, 出生地点: {{ location }}";

const PROMPT_TEMPLATE: &str = r#"请基于以下八字信息进行专业命理分析：
出生日期: {{ birth_date }}
出生时间: {{ birth_time }}
性别: {{ gender }}
出生地点: {{ location }}

请提供详细的命盘分析、五行格局、用神建议和人生运势预测。"#;

/// Raw form values, exactly as submitted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IntakeForm {
    pub birth_date: String,
    pub birth_time: String,
    pub gender: String,
    pub location: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntakeField {
    BirthDate,
    BirthTime,
    Gender,
    Location,
}

impl fmt::Display for IntakeField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            IntakeField::BirthDate => "birthDate",
            IntakeField::BirthTime => "birthTime",
            IntakeField::Gender => "gender",
            IntakeField::Location => "location",
        })
    }
}

#[derive(Debug, Error)]
pub enum IntakeError {
    #[error("required field `{0}` is empty")]
    MissingField(IntakeField),
    #[error("failed to render intake text: {0}")]
    Template(#[from] minijinja::Error),
}

impl IntakeForm {
    pub fn new(
        birth_date: impl Into<String>,
        birth_time: impl Into<String>,
        gender: impl Into<String>,
        location: impl Into<String>,
    ) -> Self {
        IntakeForm {
            birth_date: birth_date.into(),
            birth_time: birth_time.into(),
            gender: gender.into(),
            location: location.into(),
        }
    }

    /// Checks that all four fields are filled in. Whitespace is kept as a value.
    pub fn validate(&self) -> Result<(), IntakeError> {
        let fields = [
            (IntakeField::BirthDate, &self.birth_date),
            (IntakeField::BirthTime, &self.birth_time),
            (IntakeField::Gender, &self.gender),
            (IntakeField::Location, &self.location),
        ];

        match fields.iter().find(|(_, value)| value.is_empty()) {
            Some((field, _)) => Err(IntakeError::MissingField(*field)),
            None => Ok(()),
        }
    }
}

/// Display label of a time-slot code. Unknown codes are returned unchanged.
pub fn time_slot_label(code: &str) -> &str {
    TIME_SLOT_LABELS
        .iter()
        .find(|(slot, _)| *slot == code)
        .map(|(_, label)| *label)
        .unwrap_or(code)
}

/// Display label of a gender code. Anything other than `male` is shown as female.
pub fn gender_label(code: &str) -> &'static str {
    if code == "male" { "男" } else { "女" }
}

/// Renders the short echo shown in the timeline and the long prompt sent to the service.
pub struct IntakePrompts {
    env: Environment<'static>,
}

impl IntakePrompts {
    pub fn new() -> Result<Self, IntakeError> {
        let mut env = Environment::new();
        env.add_template("echo", ECHO_TEMPLATE)?;
        env.add_template("prompt", PROMPT_TEMPLATE)?;

        Ok(IntakePrompts { env })
    }

    /// One-line summary with mapped labels.
    pub fn echo(&self, form: &IntakeForm) -> Result<String, IntakeError> {
        let template = self.env.get_template("echo")?;

        Ok(template.render(context! {
            birth_date => form.birth_date,
            time_label => time_slot_label(&form.birth_time),
            gender_label => gender_label(&form.gender),
            location => form.location,
        })?)
    }

    /// Analysis request embedding the raw, unmapped values.
    pub fn analysis_prompt(&self, form: &IntakeForm) -> Result<String, IntakeError> {
        let template = self.env.get_template("prompt")?;

        Ok(template.render(context! {
            birth_date => form.birth_date,
            birth_time => form.birth_time,
            gender => form.gender,
            location => form.location,
        })?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> IntakeForm {
        IntakeForm::new("1990-01-01", "23:00", "male", "Beijing")
    }

    #[test]
    fn test_complete_form_is_valid() {
        assert!(sample().validate().is_ok());
    }

    #[test]
    fn test_each_missing_field_is_reported() {
        let cases = [
            (
                IntakeForm {
                    birth_date: String::new(),
                    ..sample()
                },
                IntakeField::BirthDate,
            ),
            (
                IntakeForm {
                    birth_time: String::new(),
                    ..sample()
                },
                IntakeField::BirthTime,
            ),
            (
                IntakeForm {
                    gender: String::new(),
                    ..sample()
                },
                IntakeField::Gender,
            ),
            (
                IntakeForm {
                    location: String::new(),
                    ..sample()
                },
                IntakeField::Location,
            ),
        ];

        for (form, field) in cases {
            match form.validate() {
                Err(IntakeError::MissingField(missing)) => assert_eq!(missing, field),
                other => panic!("expected missing {field}, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_time_slot_table() {
        assert_eq!(time_slot_label("23:00"), "子时 (23:00-01:00)");
        assert_eq!(time_slot_label("11:00"), "午时 (11:00-13:00)");
        assert_eq!(time_slot_label("21:00"), "亥时 (21:00-23:00)");
        assert_eq!(time_slot_label("12:30"), "12:30");
        assert_eq!(TIME_SLOT_LABELS.len(), 12);
    }

    #[test]
    fn test_gender_labels() {
        assert_eq!(gender_label("male"), "男");
        assert_eq!(gender_label("female"), "女");
        assert_eq!(gender_label("other"), "女");
    }

    #[test]
    fn test_whitespace_fields_are_not_empty() {
        let form = IntakeForm::new("1990-01-01", "23:00", "male", " ");
        assert!(form.validate().is_ok());
    }

    #[test]
    fn test_echo_uses_mapped_labels() {
        let prompts = IntakePrompts::new().unwrap();
        let echo = prompts.echo(&sample()).unwrap();

        assert_eq!(
            echo,
            "快速八字分析请求：出生日期: 1990-01-01, 出生时间: 子时 (23:00-01:00), 性别: 男, 出生地点: Beijing"
        );
    }

    #[test]
    fn test_prompt_uses_raw_values() {
        let prompts = IntakePrompts::new().unwrap();
        let prompt = prompts.analysis_prompt(&sample()).unwrap();

        assert!(prompt.starts_with("请基于以下八字信息进行专业命理分析：\n"));
        assert!(prompt.contains("出生时间: 23:00\n"));
        assert!(prompt.contains("性别: male\n"));
        assert!(!prompt.contains("子时"));
        assert!(prompt.ends_with("请提供详细的命盘分析、五行格局、用神建议和人生运势预测。"));
    }

    #[test]
    fn test_form_serializes_camel_case() {
        let json = serde_json::to_value(sample()).unwrap();
        assert_eq!(json["birthDate"], "1990-01-01");
        assert_eq!(json["birthTime"], "23:00");
        assert_eq!(json["gender"], "male");
        assert_eq!(json["location"], "Beijing");
    }
}
