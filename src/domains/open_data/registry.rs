//! Endpoint registry: the static description of each upstream API.

use super::category::DataCategory;

/// Description of one upstream endpoint.
#[derive(Debug)]
pub struct EndpointSpec {
    pub category: DataCategory,
    pub base_url: &'static str,
    /// Value of `searchCondition` sent alongside a non-empty keyword.
    pub search_condition: &'static str,
    /// Record fields the filter engine matches keywords against.
    pub searchable_fields: &'static [&'static str],
    /// Key of the reported total inside the envelope body.
    pub total_count_key: &'static str,
}

static PARKING: EndpointSpec = EndpointSpec {
    category: DataCategory::Parking,
    base_url: "https://apis.data.go.kr/5690000/sjParkingLotInformation1/sj_00000949",
    search_condition: "nm",
    searchable_fields: &["name", "address"],
    total_count_key: "totalCount",
};

static SMOKING_AREA: EndpointSpec = EndpointSpec {
    category: DataCategory::SmokingArea,
    base_url: "http://apis.data.go.kr/5690000/sjSmokingAreaLocation/sj_00001180",
    search_condition: "nm",
    searchable_fields: &["name", "address"],
    total_count_key: "totalCount",
};

static RESTAURANT: EndpointSpec = EndpointSpec {
    category: DataCategory::Restaurant,
    base_url: "http://apis.data.go.kr/5690000/sjRegularRestaurant/sj_00000760",
    search_condition: "mtlty",
    searchable_fields: &["name", "address", "main_menu"],
    total_count_key: "totalCount",
};

static CCTV: EndpointSpec = EndpointSpec {
    category: DataCategory::Cctv,
    base_url: "http://apis.data.go.kr/5690000/sjCCTV/sj_00000030",
    search_condition: "rdnmadr",
    searchable_fields: &["address", "purpose", "managing_agency"],
    total_count_key: "totalCount",
};

/// Look up the endpoint for a category.
pub fn resolve(category: DataCategory) -> &'static EndpointSpec {
    match category {
        DataCategory::Parking => &PARKING,
        DataCategory::SmokingArea => &SMOKING_AREA,
        DataCategory::Restaurant => &RESTAURANT,
        DataCategory::Cctv => &CCTV,
    }
}

impl EndpointSpec {
    /// Query parameters for one page request.
    ///
    /// The search pair is only added for a non-empty keyword.
    pub fn query_params(
        &self,
        service_key: &str,
        keyword: &str,
        page_index: u32,
        page_size: u32,
    ) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("serviceKey", service_key.to_string()),
            ("pageIndex", page_index.to_string()),
            ("pageUnit", page_size.to_string()),
            ("dataTy", "json".to_string()),
        ];
        let keyword = keyword.trim();
        if !keyword.is_empty() {
            params.push(("searchCondition", self.search_condition.to_string()));
            params.push(("searchKeyword", keyword.to_string()));
        }
        params
    }

    /// Full request URL with url-encoded parameters.
    pub fn request_url(
        &self,
        params: &[(&'static str, String)],
    ) -> Result<String, serde_urlencoded::ser::Error> {
        let query = serde_urlencoded::to_string(params)?;
        Ok(format!("{}?{}", self.base_url, query))
    }
}
