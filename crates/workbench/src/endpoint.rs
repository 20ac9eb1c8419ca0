//! The study lookup catalogue.

/// Wildcard study ID; upstream treats it as "all studies".
pub const DEFAULT_STUDY_ID: &str = "ST";

/// One read-only lookup against the study API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    AllStudies,
    StudySummary,
    StudyFactors,
    AllStudySummaries,
    StudyAnalysis,
    StudyMetabolites,
    StudyMeasurements,
    StudySpecies,
    StudySource,
    StudyDisease,
    UntargetedStudies,
    StudyNamedMetabolites,
    StudyMetaboliteCount,
}

impl Endpoint {
    /// Every endpoint, in catalogue order.
    pub const ALL: [Endpoint; 13] = [
        Self::AllStudies,
        Self::StudySummary,
        Self::StudyFactors,
        Self::AllStudySummaries,
        Self::StudyAnalysis,
        Self::StudyMetabolites,
        Self::StudyMeasurements,
        Self::StudySpecies,
        Self::StudySource,
        Self::StudyDisease,
        Self::UntargetedStudies,
        Self::StudyNamedMetabolites,
        Self::StudyMetaboliteCount,
    ];

    /// Name of the MCP tool exposing this endpoint.
    pub fn tool_name(self) -> &'static str {
        match self {
            Self::AllStudies => "get_all_studies",
            Self::StudySummary => "get_study_summary",
            Self::StudyFactors => "get_study_samples_and_experimental_variables",
            Self::AllStudySummaries => "get_all_study_summaries",
            Self::StudyAnalysis => "get_study_analysis",
            Self::StudyMetabolites => "get_study_metabolites",
            Self::StudyMeasurements => "get_study_metabolites_measurements",
            Self::StudySpecies => "get_study_species",
            Self::StudySource => "get_study_source",
            Self::StudyDisease => "get_study_disease",
            Self::UntargetedStudies => "get_all_studies_untargeted",
            Self::StudyNamedMetabolites => "get_study_named_metabolites",
            Self::StudyMetaboliteCount => "get_study_number_of_metabolites",
        }
    }

    /// Look up an endpoint by tool name.
    pub fn from_tool_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|e| e.tool_name() == name)
    }

    /// Whether the path depends on a study ID.
    ///
    /// The catalogue-listing endpoints use fixed paths.
    pub fn takes_study_id(self) -> bool {
        !matches!(
            self,
            Self::AllStudies | Self::AllStudySummaries | Self::UntargetedStudies
        )
    }

    /// Path segments below the REST root, unescaped.
    ///
    /// `study_id` defaults to [`DEFAULT_STUDY_ID`] and is ignored by
    /// endpoints with fixed paths.
    pub fn segments<'a>(self, study_id: Option<&'a str>) -> [&'a str; 4] {
        let id = study_id.unwrap_or(DEFAULT_STUDY_ID);
        let (id, suffix) = match self {
            Self::AllStudies => ("ST", "available"),
            Self::AllStudySummaries => ("ST", "summary"),
            Self::UntargetedStudies => ("X", "untarg_studies"),
            Self::StudySummary => (id, "summary"),
            Self::StudyFactors => (id, "factors"),
            Self::StudyAnalysis => (id, "analysis"),
            Self::StudyMetabolites => (id, "metabolites"),
            Self::StudyMeasurements => (id, "data"),
            Self::StudySpecies => (id, "species"),
            Self::StudySource => (id, "source"),
            Self::StudyDisease => (id, "disease"),
            Self::StudyNamedMetabolites => (id, "named_metabolites"),
            Self::StudyMetaboliteCount => (id, "number_of_metabolites"),
        };
        ["study", "study_id", id, suffix]
    }

    /// Path relative to the REST root, for display.
    ///
    /// Requests are built from [`Endpoint::segments`], which the client
    /// percent-encodes.
    pub fn path(self, study_id: Option<&str>) -> String {
        self.segments(study_id).join("/")
    }
}

impl std::fmt::Display for Endpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.tool_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn study_paths_use_the_given_id() {
        let cases = [
            (Endpoint::StudySummary, "summary"),
            (Endpoint::StudyFactors, "factors"),
            (Endpoint::StudyAnalysis, "analysis"),
            (Endpoint::StudyMetabolites, "metabolites"),
            (Endpoint::StudyMeasurements, "data"),
            (Endpoint::StudySpecies, "species"),
            (Endpoint::StudySource, "source"),
            (Endpoint::StudyDisease, "disease"),
            (Endpoint::StudyNamedMetabolites, "named_metabolites"),
            (Endpoint::StudyMetaboliteCount, "number_of_metabolites"),
        ];
        for (endpoint, suffix) in cases {
            assert!(endpoint.takes_study_id());
            assert_eq!(
                endpoint.path(Some("ST000001")),
                format!("study/study_id/ST000001/{suffix}")
            );
        }
    }

    #[test]
    fn fixed_paths_ignore_the_id() {
        assert_eq!(
            Endpoint::AllStudies.path(Some("ST000001")),
            "study/study_id/ST/available"
        );
        assert_eq!(
            Endpoint::AllStudySummaries.path(Some("ST000001")),
            "study/study_id/ST/summary"
        );
        assert_eq!(
            Endpoint::UntargetedStudies.path(None),
            "study/study_id/X/untarg_studies"
        );
        assert!(!Endpoint::UntargetedStudies.takes_study_id());
    }

    #[test]
    fn missing_id_falls_back_to_wildcard() {
        assert_eq!(
            Endpoint::StudySpecies.path(None),
            "study/study_id/ST/species"
        );
    }

    #[test]
    fn partial_ids_pass_through() {
        assert_eq!(
            Endpoint::StudyDisease.path(Some("ST0004")),
            "study/study_id/ST0004/disease"
        );
    }

    #[test]
    fn tool_names_are_unique_and_resolvable() {
        for endpoint in Endpoint::ALL {
            assert_eq!(Endpoint::from_tool_name(endpoint.tool_name()), Some(endpoint));
        }
        assert_eq!(Endpoint::from_tool_name("get_weather"), None);
    }
}
