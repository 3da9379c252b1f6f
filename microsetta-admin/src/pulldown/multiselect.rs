//! Multiselect option → column mapping

use super::types::{SurveyTemplate, TemplateId};
use crate::error::PulldownError;
use std::collections::HashMap;

/// Column name for one multiselect option
///
/// Spaces become underscores. Any other character outside `[0-9a-zA-Z_]`
/// is rejected rather than stripped: stripping would let `"A+"` and `"A-"`
/// share a column.
pub fn build_col_name(base: &str, option: &str) -> Result<String, PulldownError> {
    Ok(format!("{}_{}", base, option_suffix(base, option)?))
}

fn option_suffix(base: &str, option: &str) -> Result<String, PulldownError> {
    let underscored = option.replace(' ', "_");
    let cleaned: String = underscored
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_')
        .collect();

    if cleaned != underscored {
        return Err(PulldownError::UnsafeColumnName {
            base: base.to_string(),
            option: option.to_string(),
        });
    }

    Ok(cleaned)
}

/// Legal options of one checklist question
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChecklistQuestion {
    /// Template `shortname`, if the template names the field
    shortname: Option<String>,
    /// option → sanitized column suffix
    suffixes: HashMap<String, String>,
}

impl ChecklistQuestion {
    /// Column for a selected `option`, or `None` if it is not a legal option
    ///
    /// `answer_name` is the short name the answer arrived with. It names the
    /// column only when the template has no `shortname` for the field, so
    /// scalar and multiselect columns of one question share a prefix.
    pub fn column(&self, option: &str, answer_name: &str) -> Option<String> {
        let suffix = self.suffixes.get(option)?;
        let base = self.shortname.as_deref().unwrap_or(answer_name);
        Some(format!("{}_{}", base, suffix))
    }

    pub fn contains(&self, option: &str) -> bool {
        self.suffixes.contains_key(option)
    }

    pub fn len(&self) -> usize {
        self.suffixes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.suffixes.is_empty()
    }
}

/// `(template, question id)` → legal options
#[derive(Debug, Clone, Default)]
pub struct MultiselectMap {
    questions: HashMap<(TemplateId, String), ChecklistQuestion>,
}

impl MultiselectMap {
    /// Walk every checklist field of every template
    ///
    /// Options are validated here, once per pulldown. Two options of one
    /// question that would share a column abort the build.
    pub fn build(templates: &HashMap<TemplateId, SurveyTemplate>) -> Result<Self, PulldownError> {
        let mut questions = HashMap::new();

        for (template_id, template) in templates {
            for field in template.survey_template_text.all_fields() {
                if !field.is_checklist() {
                    continue;
                }

                // error label only; the column base may come from the answer
                let label = field.shortname.as_deref().unwrap_or(&field.id);
                let mut suffixes = HashMap::new();
                let mut owners: HashMap<String, String> = HashMap::new();

                for option in field.options() {
                    let suffix = option_suffix(label, &option)?;
                    if let Some(first) = owners.get(&suffix) {
                        if *first != option {
                            return Err(PulldownError::ColumnCollision {
                                base: label.to_string(),
                                first: first.clone(),
                                second: option,
                                column: format!("{}_{}", label, suffix),
                            });
                        }
                        continue;
                    }
                    owners.insert(suffix.clone(), option.clone());
                    suffixes.insert(option, suffix);
                }

                questions.insert(
                    (template_id.clone(), field.id.clone()),
                    ChecklistQuestion {
                        shortname: field.shortname.clone(),
                        suffixes,
                    },
                );
            }
        }

        Ok(Self { questions })
    }

    pub fn get(&self, template: &TemplateId, question_id: &str) -> Option<&ChecklistQuestion> {
        self.questions
            .get(&(template.clone(), question_id.to_string()))
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }
}
