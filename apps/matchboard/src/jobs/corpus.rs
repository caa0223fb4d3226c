use std::io::Read;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

const TITLE_COLUMN: &str = "Job_title";
const ROLES_COLUMN: &str = "Roles_Responsibility";
const SKILLS_COLUMN: &str = "Skills_Required";

#[derive(Debug, Error)]
pub enum CorpusError {
    #[error("failed to read job corpus: {0}")]
    Csv(#[from] csv::Error),

    #[error("job corpus is missing required column '{0}'")]
    MissingColumn(&'static str),
}

/// Which part of a posting to match against in single-field mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobField {
    RolesResponsibility,
    SkillsRequired,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobPosting {
    pub title: String,
    pub roles_responsibility: String,
    pub skills_required: String,
    /// `roles_responsibility + " " + skills_required`, computed at load.
    pub combined_jd: String,
}

impl JobPosting {
    pub fn new(title: String, roles_responsibility: String, skills_required: String) -> Self {
        let combined_jd = format!("{roles_responsibility} {skills_required}");
        Self {
            title,
            roles_responsibility,
            skills_required,
            combined_jd,
        }
    }

    pub fn field(&self, field: JobField) -> &str {
        match field {
            JobField::RolesResponsibility => &self.roles_responsibility,
            JobField::SkillsRequired => &self.skills_required,
        }
    }

    /// Splits the skills column into discrete skills on `,` `;` `|` and newlines.
    pub fn skill_list(&self) -> Vec<String> {
        self.skills_required
            .split([',', ';', '|', '\n'])
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from)
            .collect()
    }
}

#[derive(Debug, Clone, Default)]
pub struct JobCorpus {
    jobs: Vec<JobPosting>,
}

impl JobCorpus {
    pub fn new(jobs: Vec<JobPosting>) -> Self {
        Self { jobs }
    }

    pub fn from_path(path: &Path) -> Result<Self, CorpusError> {
        let file = std::fs::File::open(path).map_err(csv::Error::from)?;
        Self::from_reader(file)
    }

    /// Reads a job CSV. Header names are trimmed; columns other than the three
    /// known ones (including pandas `Unnamed: N` index columns) are ignored.
    /// Missing responsibility or skills columns read as empty text.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, CorpusError> {
        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::Headers)
            .flexible(true)
            .from_reader(reader);

        let headers = reader.headers()?.clone();
        let column = |name: &str| headers.iter().position(|h| h == name);

        let title_idx = column(TITLE_COLUMN).ok_or(CorpusError::MissingColumn(TITLE_COLUMN))?;
        let roles_idx = column(ROLES_COLUMN);
        let skills_idx = column(SKILLS_COLUMN);

        let mut jobs = Vec::new();
        for record in reader.records() {
            let record = record?;
            let cell = |idx: Option<usize>| {
                idx.and_then(|i| record.get(i))
                    .unwrap_or_default()
                    .trim()
                    .to_string()
            };
            jobs.push(JobPosting::new(
                cell(Some(title_idx)),
                cell(roles_idx),
                cell(skills_idx),
            ));
        }

        Ok(Self { jobs })
    }

    pub fn jobs(&self) -> &[JobPosting] {
        &self.jobs
    }

    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }

    /// Distinct titles in first-seen order.
    pub fn titles(&self) -> Vec<&str> {
        let mut titles: Vec<&str> = Vec::new();
        for job in &self.jobs {
            if !titles.contains(&job.title.as_str()) {
                titles.push(&job.title);
            }
        }
        titles
    }

    /// Every posting with exactly this title. A corpus may repeat titles.
    pub fn with_title<'a>(&'a self, title: &'a str) -> impl Iterator<Item = &'a JobPosting> + 'a {
        self.jobs.iter().filter(move |job| job.title == title)
    }
}
