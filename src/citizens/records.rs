use serde::Deserialize;

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CitizenRecord {
    pub id: String,
    #[serde(default)]
    pub ens: Option<String>,
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub profile_image: Option<String>,
    #[serde(default)]
    pub profile_name: Option<String>,
    #[serde(default)]
    pub profile_display_name: Option<String>,
    #[serde(default)]
    pub profile_bio: Option<String>,
    #[serde(default)]
    pub followings: Vec<FollowingRecord>,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FollowingRecord {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub following_profile_id: String,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
pub struct TokenHolderRecord {
    pub id: String,
    #[serde(default)]
    pub balance: String,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
pub struct ScoreRecord {
    pub address: String,
    #[serde(default)]
    pub score: Option<f64>,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
pub struct TrustedSeedRecord {
    pub id: String,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
pub struct PoapHolderRecord {
    #[serde(rename = "Collection")]
    pub holder: String,
    #[serde(default, rename = "Count")]
    pub count: u32,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
pub struct FollowRecord {
    pub source: String,
    pub target: String,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ReferralRecord {
    pub recipient: String,
    pub referred_by: String,
    #[serde(default)]
    pub rpgf_round: String,
    #[serde(default)]
    pub referred_method: String,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TransferRecord {
    pub from: String,
    pub to: String,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub token_symbol: Option<String>,
    #[serde(default)]
    pub value: Option<f64>,
    #[serde(default)]
    pub hash: Option<String>,
}
