/// Default WFS endpoint of the municipal parking API
pub const DEFAULT_WFS_URL: &str = "https://parcari3.ro:8443/parcari/api/Parking/wfs";

/// GetFeature query parameters for the WFS endpoint
#[derive(Debug, Clone, PartialEq)]
pub struct WfsQuery {
    pub service: String,
    pub version: String,
    pub request: String,
    /// Layer holding the parking spots
    pub type_name: String,
    pub geometry_name: String,
    pub output_format: String,
    /// Coordinate reference system of the bbox and the geometry
    pub srs_name: String,
    /// `minx,miny,maxx,maxy,CRS`
    pub bbox: String,
}

impl WfsQuery {
    /// Query pairs in the order the endpoint documents them
    pub fn pairs(&self) -> [(&'static str, &str); 8] {
        [
            ("service", &self.service),
            ("version", &self.version),
            ("request", &self.request),
            ("typeName", &self.type_name),
            ("geometryName", &self.geometry_name),
            ("outputFormat", &self.output_format),
            ("srsname", &self.srs_name),
            ("bbox", &self.bbox),
        ]
    }
}

impl Default for WfsQuery {
    /// Spots around the Vitan lot
    fn default() -> Self {
        Self {
            service: "WFS".to_string(),
            version: "1.0.0".to_string(),
            request: "GetFeature".to_string(),
            type_name: "PS3:v_123_cad_loc_parcare_arie".to_string(),
            geometry_name: "geometry".to_string(),
            output_format: "application/json".to_string(),
            srs_name: "EPSG:3844".to_string(),
            bbox: "590355.5353482877,324499.2637742758,590454.5536491674,324582.69862268283,EPSG:3844"
                .to_string(),
        }
    }
}
