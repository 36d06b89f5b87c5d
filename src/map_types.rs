//! The supported region collections, as one table.
//!
//! Each entry names its GeoJSON asset and its region kind; the kind determines which feature
//! properties can serve as join codes and how they are described to template authors.

/// What sort of regions an asset contains.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegionKind {
    Countries,
    JapanPrefectures,
    IndiaStates,
    /// Districts of a single Indian state or union territory.
    IndiaDistricts { region: &'static str },
}

/// A feature property usable as join key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CodeType {
    pub key: &'static str,
    pub label: &'static str,
    /// Shown in the template hint next to `{{ @@key }}`.
    pub description: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MapType {
    pub id: &'static str,
    pub label: &'static str,
    pub asset: &'static str,
    pub kind: RegionKind,
}

const COUNTRY_CODES: &[CodeType] = &[
    CodeType { key: "name", label: "Short name", description: "short country name" },
    CodeType { key: "name_long", label: "Full name", description: "full country name" },
    CodeType { key: "abbrev", label: "Abbreviated name", description: "abbreviated country name" },
    CodeType { key: "iso_a2", label: "ISO code (2 letters)", description: "two-letter ISO country code" },
    CodeType { key: "iso_a3", label: "ISO code (3 letters)", description: "three-letter ISO country code" },
    CodeType { key: "iso_n3", label: "ISO code (3 digits)", description: "three-digit ISO country code" },
];

const JAPAN_CODES: &[CodeType] = &[
    CodeType { key: "name", label: "Name", description: "Prefecture name in English" },
    CodeType { key: "name_local", label: "Name (local)", description: "Prefecture name in Kanji" },
    CodeType { key: "iso_3166_2", label: "ISO-3166-2", description: "five-letter ISO subdivision code (JP-xx)" },
];

const INDIA_STATE_CODES: &[CodeType] = &[
    CodeType { key: "name", label: "Name", description: "State name in English" },
    CodeType { key: "id", label: "Id (1-37)", description: "Id (1-37)" },
];

const INDIA_DISTRICT_CODES: &[CodeType] = &[
    CodeType { key: "name", label: "Name", description: "District name in English" },
    CodeType { key: "id", label: "Id (1-732)", description: "Id (1-732)" },
];

impl RegionKind {
    pub fn code_types(&self) -> &'static [CodeType] {
        match self {
            RegionKind::Countries => COUNTRY_CODES,
            RegionKind::JapanPrefectures => JAPAN_CODES,
            RegionKind::IndiaStates => INDIA_STATE_CODES,
            RegionKind::IndiaDistricts { .. } => INDIA_DISTRICT_CODES,
        }
    }
}

macro_rules! india_districts {
    ($($id:literal, $region:literal, $asset:literal;)*) => {
        [$(MapType {
            id: $id,
            label: concat!("India/", $region),
            asset: $asset,
            kind: RegionKind::IndiaDistricts { region: $region },
        },)*]
    };
}

static INDIA_DISTRICTS: [MapType; 36] = india_districts! {
    "chandigarh_india", "chandigarh", "india.chandigarh.geo.json";
    "dadraNagar_india", "dadraNagar", "india.dadra_and_nagar_have.geo.json";
    "delhi_india", "delhi", "india.delhi.geo.json";
    "puducherry_india", "puducherry", "india.puducherry.geo.json";
    "goa_india", "goa", "india.goa.geo.json";
    "damanDiu_india", "damanDiu", "india.daman_and_diu.geo.json";
    "sikkim_india", "sikkim", "india.sikkim.geo.json";
    "tripura_india", "tripura", "india.tripura.geo.json";
    "meghalaya_india", "meghalaya", "india.meghalaya.geo.json";
    "lakshadweep_india", "lakshadweep", "india.lakshadweep.geo.json";
    "nagaland_india", "nagaland", "india.nagaland.geo.json";
    "manipur_india", "manipur", "india.manipur.geo.json";
    "mizoram_india", "mizoram", "india.mizoram.geo.json";
    "himachalPradesh_india", "himachalPradesh", "india.himachal_pradesh.geo.json";
    "arunachalPradesh_india", "arunachalPradesh", "india.arunachal_pradesh.geo.json";
    "telangana_india", "telangana", "india.telangana.geo.json";
    "haryana_india", "haryana", "india.haryana.geo.json";
    "kerala_india", "kerala", "india.kerala.geo.json";
    "uttarakhand_india", "uttarakhand", "india.uttarakhand.geo.json";
    "punjab_india", "punjab", "india.punjab.geo.json";
    "jammuKashmir_india", "jammuKashmir", "india.jammu_and_kashmir.geo.json";
    "andhraPradesh_india", "andhraPradesh", "india.andhra_pradesh.geo.json";
    "jharkhand_india", "jharkhand", "india.jharkhand.geo.json";
    "chhattisgarh_india", "chhattisgarh", "india.chhattisgarh.geo.json";
    "assam_india", "assam", "india.assam.geo.json";
    "bihar_india", "bihar", "india.bihar.geo.json";
    "odisha_india", "odisha", "india.odisha.geo.json";
    "karnataka_india", "karnataka", "india.karnataka.geo.json";
    "tamilNadu_india", "tamilNadu", "india.tamil_nadu.geo.json";
    "rajasthan_india", "rajasthan", "india.rajasthan.geo.json";
    "maharashtra_india", "maharashtra", "india.maharashtra.geo.json";
    "uttarPradesh_india", "uttarPradesh", "india.uttar_pradesh.geo.json";
    "madhyaPradesh_india", "madhyaPradesh", "india.madhya_pradesh.geo.json";
    "andamanNicobar_india", "andamanNicobar", "india.andaman_and_nicobar.geo.json";
    "westBengal_india", "westBengal", "india.west_bengal.geo.json";
    "gujarat_india", "gujarat", "india.gujarat.geo.json";
};

static BASE_MAPS: [MapType; 3] = [
    MapType {
        id: "countries",
        label: "Countries",
        asset: "countries.geo.json",
        kind: RegionKind::Countries,
    },
    MapType {
        id: "subdiv_japan",
        label: "Japan/Prefectures",
        asset: "japan.prefectures.geo.json",
        kind: RegionKind::JapanPrefectures,
    },
    MapType {
        id: "state_india",
        label: "India/States",
        asset: "india.state.geo.json",
        kind: RegionKind::IndiaStates,
    },
];

/// Every supported map type, in the order the editor lists them.
pub fn all() -> impl Iterator<Item = &'static MapType> {
    BASE_MAPS.iter().chain(INDIA_DISTRICTS.iter())
}

/// Look up a map type by id. Unknown ids yield `None` (the map renders nothing).
pub fn lookup(id: &str) -> Option<&'static MapType> {
    all().find(|m| m.id == id)
}

impl MapType {
    pub fn code_types(&self) -> &'static [CodeType] {
        self.kind.code_types()
    }

    pub fn supports_code_type(&self, key: &str) -> bool {
        self.code_types().iter().any(|c| c.key == key)
    }

    /// Help text listing the special template names available for this map type.
    pub fn template_hint(&self) -> String {
        let mut out = String::from(
            "All query result columns can be referenced using {{ column_name }} syntax.\n\
             Use special names to access additional properties:\n\
             {{ @@value }} formatted value;\n",
        );
        for c in self.code_types() {
            out.push_str(&format!("{{{{ @@{} }}}} {};\n", c.key, c.description));
        }
        out.push_str("This syntax is applicable to tooltip and popup templates.");
        out
    }
}
