use std::{fmt, str::FromStr};

use thiserror::Error;

use super::property::Property;

/// Values the browse page sends to mean "no constraint".
const WILDCARDS: [&str; 2] = ["Any", "All"];

#[derive(Debug, Error, PartialEq)]
pub enum FilterError {
    #[error("Invalid {param} value: {value}")]
    InvalidValue { param: &'static str, value: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BedroomFilter {
    Exact(i32),
    AtLeast(i32),
}

impl BedroomFilter {
    pub fn matches(&self, bedrooms: i32) -> bool {
        match *self {
            BedroomFilter::Exact(n) => bedrooms == n,
            BedroomFilter::AtLeast(n) => bedrooms >= n,
        }
    }
}

impl FromStr for BedroomFilter {
    type Err = FilterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || FilterError::InvalidValue {
            param: "bedrooms",
            value: s.to_string(),
        };
        let (digits, at_least) = match s.strip_suffix('+') {
            Some(digits) => (digits, true),
            None => (s, false),
        };
        let n = digits.parse::<i32>().map_err(|_| invalid())?;
        if n < 0 {
            return Err(invalid());
        }
        Ok(if at_least {
            BedroomFilter::AtLeast(n)
        } else {
            BedroomFilter::Exact(n)
        })
    }
}

impl fmt::Display for BedroomFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BedroomFilter::Exact(n) => write!(f, "{}", n),
            BedroomFilter::AtLeast(n) => write!(f, "{}+", n),
        }
    }
}

/// Filter set of the browse page. Only non-empty, non-wildcard values are kept.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListingFilter {
    pub search: Option<String>,
    pub town: Option<String>,
    pub property_type: Option<String>,
    pub bedrooms: Option<BedroomFilter>,
    pub min_price: Option<i64>,
    pub max_price: Option<i64>,
}

/// Trims a raw parameter and drops it when empty or a wildcard.
pub fn forwarded_value(raw: &str) -> Option<String> {
    let value = raw.trim();
    if value.is_empty() || WILDCARDS.contains(&value) {
        None
    } else {
        Some(value.to_string())
    }
}

fn parse_price(param: &'static str, value: String) -> Result<i64, FilterError> {
    value
        .parse::<i64>()
        .map_err(|_| FilterError::InvalidValue { param, value })
}

impl ListingFilter {
    /// Builds a filter from query-string pairs. Unknown keys are ignored and
    /// the last occurrence of a key wins.
    pub fn from_pairs<'a, I>(pairs: I) -> Result<Self, FilterError>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut filter = ListingFilter::default();

        for (key, raw) in pairs {
            let value = forwarded_value(raw);
            match key {
                "search" => filter.search = value,
                "town" => filter.town = value,
                "type" => filter.property_type = value,
                "bedrooms" => filter.bedrooms = value.map(|v| v.parse()).transpose()?,
                "minPrice" => {
                    filter.min_price = value.map(|v| parse_price("minPrice", v)).transpose()?
                }
                "maxPrice" => {
                    filter.max_price = value.map(|v| parse_price("maxPrice", v)).transpose()?
                }
                _ => {}
            }
        }

        Ok(filter)
    }

    /// Query string carrying only the forwarded parameters, in a fixed order.
    pub fn to_query_string(&self) -> String {
        let pairs: [(&str, Option<String>); 6] = [
            ("search", self.search.clone()),
            ("town", self.town.clone()),
            ("type", self.property_type.clone()),
            ("bedrooms", self.bedrooms.map(|b| b.to_string())),
            ("minPrice", self.min_price.map(|p| p.to_string())),
            ("maxPrice", self.max_price.map(|p| p.to_string())),
        ];

        pairs
            .into_iter()
            .filter_map(|(key, value)| {
                value.map(|v| format!("{}={}", key, urlencoding::encode(&v)))
            })
            .collect::<Vec<_>>()
            .join("&")
    }

    pub fn is_empty(&self) -> bool {
        *self == ListingFilter::default()
    }

    pub fn matches(&self, property: &Property) -> bool {
        if let Some(ref search) = self.search {
            let needle = search.to_lowercase();
            let hit = [&property.name, &property.location, &property.description]
                .iter()
                .any(|field| field.to_lowercase().contains(&needle));
            if !hit {
                return false;
            }
        }

        if let Some(ref town) = self.town {
            if !property
                .location
                .to_lowercase()
                .contains(&town.to_lowercase())
            {
                return false;
            }
        }

        if let Some(ref property_type) = self.property_type {
            if !property
                .property_type
                .as_str()
                .eq_ignore_ascii_case(property_type)
            {
                return false;
            }
        }

        if let Some(bedrooms) = self.bedrooms {
            if !bedrooms.matches(property.bedrooms) {
                return false;
            }
        }

        if self.min_price.is_some_and(|min| property.price < min) {
            return false;
        }

        if self.max_price.is_some_and(|max| property.price > max) {
            return false;
        }

        true
    }
}
