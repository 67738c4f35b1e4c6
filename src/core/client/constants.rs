//! Centralized constants for default endpoints and UA.

pub(crate) const USER_AGENT: &str = concat!("icm-extract/", env!("CARGO_PKG_VERSION"));

/// Access-manager login endpoint; answers with the token in the `authorization` header.
pub(crate) const DEFAULT_LOGIN_URL: &str =
    "https://b2b.magnasteyr.com/accessmanager-access/jwt/login";

/// Host serving the ICM REST API and its web assets (paths below are joined onto it).
pub(crate) const DEFAULT_BASE_URL: &str = "https://apps01.magnasteyr.com/";

pub(crate) const MATERIAL_DATA_PATH: &str = "icmnfRest/upp/uppMatDataProvider";
pub(crate) const CHANGE_ELEMENT_PART_PATH: &str = "icmnfRest/dataprovider/chgelemPart";
pub(crate) const CLASS_PARAM_DATA_PATH: &str =
    "icmnfRest/dataprovider/uppviewMatClassParamDataProvider";
pub(crate) const CLASS_FILTER_PATH: &str = "icmnfRest/upp/uppviewMatClassesFilter";
pub(crate) const TRANSLATIONS_PATH: &str = "icmnfext/assets/i18n/en.json";
pub(crate) const LIST_VALUES_PATH: &str = "icmnfRest/lov/";

/// Claims requested from the access manager on login.
pub(crate) const LOGIN_CLAIMS: [&str; 5] = ["name", "mail", "sn", "givenName", "exp"];
