//! GetRecords constraints, rendered as CQL text or as an OGC Filter.

use std::fmt::Write as _;

use quick_xml::escape::escape;

/// Kind of records to harvest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum RecordType {
    Service,
    Dataset,
}

impl RecordType {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Service => "service",
            Self::Dataset => "dataset",
        }
    }
}

/// Constraint language of a GetRecords request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum FilterLanguage {
    #[default]
    Cql,
    Filter,
}

impl FilterLanguage {
    /// Value of the `constraintLanguage` KVP parameter.
    #[must_use]
    pub fn as_kvp(&self) -> &'static str {
        match self {
            Self::Cql => "CQL_TEXT",
            Self::Filter => "FILTER",
        }
    }
}

/// One comparison in a constraint.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Condition<'a> {
    Equals(&'static str, &'a str),
    /// Substring match.
    Like(&'static str, &'a str),
}

/// Search criteria for a GetRecords request. All criteria are optional and
/// combined with AND.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordsQuery {
    pub record_type: Option<RecordType>,
    pub organisation: Option<String>,
    /// Matched as a substring.
    pub title: Option<String>,
    pub identifier: Option<String>,
}

impl RecordsQuery {
    fn conditions(&self) -> Vec<Condition<'_>> {
        let mut conditions = Vec::new();
        if let Some(record_type) = self.record_type {
            conditions.push(Condition::Equals("type", record_type.as_str()));
        }
        if let Some(organisation) = self.organisation.as_deref() {
            conditions.push(Condition::Equals("OrganisationName", organisation));
        }
        if let Some(title) = self.title.as_deref() {
            conditions.push(Condition::Like("title", title));
        }
        if let Some(identifier) = self.identifier.as_deref() {
            conditions.push(Condition::Equals("Identifier", identifier));
        }
        conditions
    }

    /// `true` when no criterion is set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.conditions().is_empty()
    }

    /// Render the constraint in the requested language; `None` without criteria.
    #[must_use]
    pub fn render(&self, language: FilterLanguage) -> Option<String> {
        if self.is_empty() {
            return None;
        }
        Some(match language {
            FilterLanguage::Cql => self.to_cql(),
            FilterLanguage::Filter => self.to_filter(),
        })
    }

    /// CQL text, e.g. `type='service' AND title LIKE '%wegen%'`.
    ///
    /// # Examples
    /// ```
    /// use metadata_tool::csw::{RecordType, RecordsQuery};
    ///
    /// let query = RecordsQuery {
    ///     record_type: Some(RecordType::Service),
    ///     organisation: Some("Beheer PDOK".to_string()),
    ///     ..Default::default()
    /// };
    /// assert_eq!(query.to_cql(), "type='service' AND OrganisationName='Beheer PDOK'");
    /// ```
    #[must_use]
    pub fn to_cql(&self) -> String {
        self.conditions()
            .iter()
            .map(|condition| match condition {
                Condition::Equals(name, value) => format!("{name}='{}'", cql_escape(value)),
                Condition::Like(name, value) => format!("{name} LIKE '%{}%'", cql_escape(value)),
            })
            .collect::<Vec<_>>()
            .join(" AND ")
    }

    /// OGC Filter Encoding 1.1 XML.
    #[must_use]
    pub fn to_filter(&self) -> String {
        let conditions = self.conditions();
        let mut body = String::new();
        for condition in &conditions {
            match condition {
                Condition::Equals(name, value) => {
                    let _ = write!(
                        body,
                        "<ogc:PropertyIsEqualTo><ogc:PropertyName>{name}</ogc:PropertyName><ogc:Literal>{}</ogc:Literal></ogc:PropertyIsEqualTo>",
                        escape(*value)
                    );
                }
                Condition::Like(name, value) => {
                    let _ = write!(
                        body,
                        "<ogc:PropertyIsLike wildCard=\"%\" singleChar=\"_\" escapeChar=\"\\\"><ogc:PropertyName>{name}</ogc:PropertyName><ogc:Literal>%{}%</ogc:Literal></ogc:PropertyIsLike>",
                        escape(*value)
                    );
                }
            }
        }
        if conditions.len() > 1 {
            body = format!("<ogc:And>{body}</ogc:And>");
        }
        format!("<ogc:Filter xmlns:ogc=\"http://www.opengis.net/ogc\">{body}</ogc:Filter>")
    }
}

fn cql_escape(value: &str) -> String {
    value.replace('\'', "''")
}
