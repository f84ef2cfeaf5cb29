//! Static recommendation text per diagnosis

/// Diagnosis categories the classifier knows about
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagnosisCategory {
    Cataract,
    DiabeticRetinopathy,
    Glaucoma,
    Normal,
    Other,
}

impl DiagnosisCategory {
    /// Category of a classifier label such as `diabetic_retinopathy` or
    /// `Diabetic Retinopathy`
    pub fn from_label(label: &str) -> Self {
        match normalize(label).as_str() {
            "cataract" => DiagnosisCategory::Cataract,
            "diabetic_retinopathy" => DiagnosisCategory::DiabeticRetinopathy,
            "glaucoma" => DiagnosisCategory::Glaucoma,
            "normal" => DiagnosisCategory::Normal,
            _ => DiagnosisCategory::Other,
        }
    }

    pub fn recommendation(&self) -> &'static str {
        match self {
            DiagnosisCategory::Cataract => {
                "Signs of cataract detected. Schedule an appointment with an ophthalmologist \
                 to assess lens clouding and discuss whether surgery is appropriate. Wear \
                 sunglasses outdoors and avoid driving at night if glare affects your vision."
            }
            DiagnosisCategory::DiabeticRetinopathy => {
                "Signs of diabetic retinopathy detected. See an eye specialist promptly for a \
                 dilated eye exam. Keep your blood sugar, blood pressure and cholesterol under \
                 control and have your eyes checked at least once a year."
            }
            DiagnosisCategory::Glaucoma => {
                "Signs of glaucoma detected. Consult an ophthalmologist soon to measure your \
                 intraocular pressure and examine the optic nerve. Early treatment can prevent \
                 further loss of vision."
            }
            DiagnosisCategory::Normal => {
                "No signs of disease detected. Continue regular eye check-ups every one to two \
                 years and protect your eyes from excessive screen time and UV light."
            }
            DiagnosisCategory::Other => {
                "Please consult an eye care professional for a complete examination and an \
                 accurate diagnosis."
            }
        }
    }
}

/// Recommendation text for a classifier label
pub fn recommendation_for(label: &str) -> &'static str {
    DiagnosisCategory::from_label(label).recommendation()
}

/// Human-readable form of a classifier label: `diabetic_retinopathy` becomes
/// `Diabetic Retinopathy`
pub fn display_name(label: &str) -> String {
    label
        .split(['_', '-', ' '])
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first
                    .to_uppercase()
                    .chain(chars.flat_map(char::to_lowercase))
                    .collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}

fn normalize(label: &str) -> String {
    label
        .trim()
        .to_lowercase()
        .replace([' ', '-'], "_")
}
