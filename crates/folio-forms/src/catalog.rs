//! Certificates that can be requested through the certificate form.

use serde::Serialize;

use crate::{FormsError, Result};

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Certificate {
    pub key: &'static str,
    pub name: &'static str,
    pub issuer: &'static str,
    pub date: &'static str,
    pub highlight: bool,
}

const fn cert(key: &'static str, name: &'static str, issuer: &'static str, date: &'static str) -> Certificate {
    Certificate { key, name, issuer, date, highlight: false }
}

pub static CERTIFICATES: &[Certificate] = &[
    Certificate {
        key: "degree-beng-unn",
        name: "Bachelor of Engineering in Electronic Engineering",
        issuer: "University of Nigeria, Nsukka",
        date: "September 2017 – November 2022",
        highlight: true,
    },
    cert("prodev-alx-2025", "Back-End Web Development (ProDev)", "ALX Africa", "2025"),
    cert("sdc-3mtt-2024", "Software Development Certification", "3MTT", "2024"),
    cert("plp-powerlearn-2024", "Fullstack Software Engineering Certification", "Power Learn Project (PLP)", "2025"),
    cert("ai-creatives-alx-2024", "AI for Creatives", "ALX Africa", "2024"),
    cert("gen-ai-microsoft-2024", "Career Essentials in Generative AI", "Microsoft", "2024"),
    cert("cva-alx-2024", "Certified Virtual Assistant", "ALX Africa", "2024"),
    cert("devops-ibm-2023", "IBM Applied DevOps Engineering Professional Certificate", "IBM", "2023"),
];

pub fn all() -> &'static [Certificate] {
    CERTIFICATES
}

pub fn find(key: &str) -> Result<&'static Certificate> {
    CERTIFICATES
        .iter()
        .find(|c| c.key == key)
        .ok_or_else(|| FormsError::UnknownCertificate(key.to_string()))
}
