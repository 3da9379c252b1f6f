//! Fixed values used when building pulldown tables

/// Fill value for cells with no data
pub const MISSING_VALUE: &str = "Missing: not provided";

/// Fill value for multiselect options that were not chosen
pub const NOT_SELECTED: &str = "false";

/// Cell value for a chosen multiselect option
pub const SELECTED: &str = "true";

pub const HOST_SUBJECT_ID: &str = "HOST_SUBJECT_ID";
pub const COLLECTION_TIMESTAMP: &str = "COLLECTION_TIMESTAMP";
pub const SAMPLE_TYPE: &str = "SAMPLE_TYPE";

/// Columns of the personal microbiome module start with this (lowercased)
pub const PRIVATE_MODULE_PREFIX: &str = "pm_";

/// Columns never exported, compared lowercased
pub const EBI_REMOVE: &[&str] = &[
    "about_yourself_text",
    "antibiotic_condition",
    "antibiotic_med",
    "birth_month",
    "cat_contact",
    "cat_location",
    "conditions_medication",
    "diet_restrictions_list",
    "dog_contact",
    "dog_location",
    "gender",
    "mainfactor_other_1",
    "mainfactor_other_2",
    "mainfactor_other_3",
    "medication_list",
    "other_conditions_suffer",
    "other_supplement_frequency",
    "pets_other_freetext",
    "race_other",
    "special_restrictions",
    "supplements",
    "travel_locations_list",
    "willing_to_be_contacted",
    "zip_code",
];

/// Site-specific columns for human samples
///
/// Every human site names its body habitat, product and site in UBERON terms
/// and the metagenome it belongs to.
pub const HUMAN_SITE_INVARIANTS: &[(&str, &[(&str, &str)])] = &[
    (
        "Stool",
        &[
            ("body_habitat", "UBERON:feces"),
            ("body_product", "UBERON:feces"),
            ("body_site", "UBERON:feces"),
            ("env_material", "feces"),
            ("env_package", "human-gut"),
            ("description", "American Gut Project Stool sample"),
            ("scientific_name", "human gut metagenome"),
            ("taxon_id", "408170"),
        ],
    ),
    (
        "Mouth",
        &[
            ("body_habitat", "UBERON:oral cavity"),
            ("body_product", "UBERON:saliva"),
            ("body_site", "UBERON:tongue"),
            ("env_material", "saliva"),
            ("env_package", "human-oral"),
            ("description", "American Gut Project Mouth sample"),
            ("scientific_name", "human oral metagenome"),
            ("taxon_id", "447426"),
        ],
    ),
    (
        "Nares",
        &[
            ("body_habitat", "UBERON:nose"),
            ("body_product", "UBERON:mucus"),
            ("body_site", "UBERON:nostril"),
            ("env_material", "mucus"),
            ("env_package", "human-associated"),
            ("description", "American Gut Project Nares sample"),
            ("scientific_name", "human nasal/pharyngeal metagenome"),
            ("taxon_id", "1131769"),
        ],
    ),
    (
        "Nasal mucus",
        &[
            ("body_habitat", "UBERON:nose"),
            ("body_product", "UBERON:mucus"),
            ("body_site", "UBERON:nostril"),
            ("env_material", "mucus"),
            ("env_package", "human-associated"),
            ("description", "American Gut Project Nasal mucus sample"),
            ("scientific_name", "human nasal/pharyngeal metagenome"),
            ("taxon_id", "1131769"),
        ],
    ),
    (
        "Forehead",
        &[
            ("body_habitat", "UBERON:skin"),
            ("body_product", "UBERON:sebum"),
            ("body_site", "UBERON:skin of head"),
            ("env_material", "sebum"),
            ("env_package", "human-skin"),
            ("description", "American Gut Project Forehead sample"),
            ("scientific_name", "human skin metagenome"),
            ("taxon_id", "539655"),
        ],
    ),
    (
        "Left hand",
        &[
            ("body_habitat", "UBERON:skin"),
            ("body_product", "UBERON:sebum"),
            ("body_site", "UBERON:skin of hand"),
            ("env_material", "sebum"),
            ("env_package", "human-skin"),
            ("description", "American Gut Project Left Hand sample"),
            ("scientific_name", "human skin metagenome"),
            ("taxon_id", "539655"),
        ],
    ),
    (
        "Right hand",
        &[
            ("body_habitat", "UBERON:skin"),
            ("body_product", "UBERON:sebum"),
            ("body_site", "UBERON:skin of hand"),
            ("env_material", "sebum"),
            ("env_package", "human-skin"),
            ("description", "American Gut Project Right Hand sample"),
            ("scientific_name", "human skin metagenome"),
            ("taxon_id", "539655"),
        ],
    ),
    (
        "Left leg",
        &[
            ("body_habitat", "UBERON:skin"),
            ("body_product", "UBERON:sebum"),
            ("body_site", "UBERON:skin of leg"),
            ("env_material", "sebum"),
            ("env_package", "human-skin"),
            ("description", "American Gut Project Left Leg sample"),
            ("scientific_name", "human skin metagenome"),
            ("taxon_id", "539655"),
        ],
    ),
    (
        "Right leg",
        &[
            ("body_habitat", "UBERON:skin"),
            ("body_product", "UBERON:sebum"),
            ("body_site", "UBERON:skin of leg"),
            ("env_material", "sebum"),
            ("env_package", "human-skin"),
            ("description", "American Gut Project Right Leg sample"),
            ("scientific_name", "human skin metagenome"),
            ("taxon_id", "539655"),
        ],
    ),
    (
        "Vaginal mucus",
        &[
            ("body_habitat", "UBERON:vagina"),
            ("body_product", "UBERON:mucus"),
            ("body_site", "UBERON:vagina"),
            ("env_material", "mucus"),
            ("env_package", "human-vaginal"),
            ("description", "American Gut Project Vaginal mucus sample"),
            ("scientific_name", "human vaginal metagenome"),
            ("taxon_id", "1632839"),
        ],
    ),
    (
        "Tears",
        &[
            ("body_habitat", "UBERON:eye"),
            ("body_product", "UBERON:tears"),
            ("body_site", "UBERON:eye"),
            ("env_material", "tears"),
            ("env_package", "human-associated"),
            ("description", "American Gut Project Tears sample"),
            ("scientific_name", "human metagenome"),
            ("taxon_id", "646099"),
        ],
    ),
    (
        "Ear wax",
        &[
            ("body_habitat", "UBERON:ear"),
            ("body_product", "UBERON:cerumen"),
            ("body_site", "UBERON:external auditory meatus"),
            ("env_material", "cerumen"),
            ("env_package", "human-associated"),
            ("description", "American Gut Project Ear wax sample"),
            ("scientific_name", "human metagenome"),
            ("taxon_id", "646099"),
        ],
    ),
    (
        "Hair",
        &[
            ("body_habitat", "UBERON:hair"),
            ("body_product", "UBERON:sebum"),
            ("body_site", "UBERON:hair"),
            ("env_material", "sebum"),
            ("env_package", "human-skin"),
            ("description", "American Gut Project Hair sample"),
            ("scientific_name", "human metagenome"),
            ("taxon_id", "646099"),
        ],
    ),
];

/// Invariant columns for a human sample site
pub fn human_site_invariants(site: &str) -> Option<&'static [(&'static str, &'static str)]> {
    HUMAN_SITE_INVARIANTS
        .iter()
        .find(|(name, _)| *name == site)
        .map(|(_, invariants)| *invariants)
}
