//! Company reconciliation.
//!
//! Every company name a job or contact refers to must have exactly one
//! company record. The job or contact keeps its text as typed; only the
//! company collection changes.

use tracing::info;

use crate::models::Company;
use crate::utils::names_match;

/// The company whose name matches `name` ignoring case
#[must_use]
pub fn find_company<'a>(companies: &'a [Company], name: &str) -> Option<&'a Company> {
    companies.iter().find(|company| names_match(&company.name, name))
}

/// Insert a bare company named `name` unless one already matches.
///
/// Blank names are ignored. Returns the index of the created company, or
/// `None` when nothing was inserted. `mint_id` is called until it yields an
/// id not used by any company.
pub(crate) fn reconcile<F>(companies: &mut Vec<Company>, name: &str, mut mint_id: F) -> Option<usize>
where
    F: FnMut() -> String,
{
    if name.trim().is_empty() || find_company(companies, name).is_some() {
        return None;
    }

    let id = loop {
        let candidate = mint_id();
        if !companies.iter().any(|company| company.id == candidate) {
            break candidate;
        }
    };

    info!(company = name, id = %id, "Created company from reference");
    companies.push(Company::named(id, name));
    Some(companies.len() - 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn counter() -> impl FnMut() -> String {
        let mut n = 0;
        move || {
            n += 1;
            format!("c{n}")
        }
    }

    #[test]
    fn test_creates_missing_company() {
        let mut companies = Vec::new();
        assert_eq!(reconcile(&mut companies, "Acme", counter()), Some(0));
        assert_eq!(companies[0].name, "Acme");
        assert!(companies[0].website.is_none());
    }

    #[test]
    fn test_case_insensitive_match_is_noop() {
        let mut companies = vec![Company::named("x", "ACME")];
        assert_eq!(reconcile(&mut companies, "acme", counter()), None);
        assert_eq!(companies.len(), 1);
        assert_eq!(companies[0].name, "ACME");
    }

    #[test]
    fn test_blank_name_ignored() {
        let mut companies = Vec::new();
        assert_eq!(reconcile(&mut companies, "", counter()), None);
        assert_eq!(reconcile(&mut companies, "   ", counter()), None);
        assert!(companies.is_empty());
    }

    #[test]
    fn test_skips_colliding_id() {
        let mut companies = vec![Company::named("c1", "Globex")];
        reconcile(&mut companies, "Initech", counter());
        assert_eq!(companies[1].id, "c2");
    }
}
