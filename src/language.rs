use anyhow::{anyhow, Error};
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Language {
    French,
    English,
}

impl FromStr for Language {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "French" => Ok(Language::French),
            "English" => Ok(Language::English),
            other => Err(anyhow!("{} language not supported.", other)),
        }
    }
}

/// (label, feature property) pairs shown on hover.
pub type Tooltips = [(&'static str, &'static str); 6];

const FR_TITLE: &str = "Transactions foncières en Occitanie du 1er janvier 2016 au 31 décembre 2020.";

const FR_TOOLTIPS: Tooltips = [
    ("Nom de la commune", "commune_name"),
    ("Nombre de transactions", "transaction_number"),
    ("Nombre de transactions de maisons", "house_number"),
    ("Nombre de transactions de locaux industriels, commerciaux ou assimilés", "indus_number"),
    ("Nombre de transactions d'appartements", "app_number"),
    ("Valeur moyenne des transactions", "mean_value"),
];

const EN_TITLE: &str = "Land transactions in Occitania from January 1st 2016 to December 31st 2020.";

const EN_TOOLTIPS: Tooltips = [
    ("Name of the municipality", "commune_name"),
    ("Number of transactions", "transaction_number"),
    ("Number of home transactions", "house_number"),
    ("Number of transactions of industrial, commercial or similar premises", "indus_number"),
    ("Number of apartment transactions", "app_number"),
    ("Mean transaction value", "mean_value"),
];

impl Language {
    pub fn title(&self) -> &'static str {
        match self {
            Language::French => FR_TITLE,
            Language::English => EN_TITLE,
        }
    }

    pub fn tooltips(&self) -> &'static Tooltips {
        match self {
            Language::French => &FR_TOOLTIPS,
            Language::English => &EN_TOOLTIPS,
        }
    }

    /// `lang` attribute of the HTML page.
    pub fn code(&self) -> &'static str {
        match self {
            Language::French => "fr",
            Language::English => "en",
        }
    }
}
