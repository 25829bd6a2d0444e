//! # 地理计算
//!
//! 提供经纬度坐标类型与大圆距离（haversine）计算。
//!
//! 距离以公里为单位，地球半径取 [`EARTH_RADIUS_KM`]。所有函数都是纯函数，
//! 坐标合法性由调用方在实体创建时通过 [`Coordinate::validate`] 保证。
//!
//! ```rust
//! use fleet_core::geo::{haversine_km, Coordinate};
//!
//! let pickup = Coordinate::new(40.7128, -74.0060);
//! let bot = Coordinate::new(40.7138, -74.0070);
//! let km = haversine_km(&pickup, &bot);
//! assert!(km > 0.1 && km < 0.2);
//! ```

use serde::{Deserialize, Serialize};

use crate::errors::{FleetError, Result};

/// 地球半径（公里）
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// 距离比较容差（公里），差值不超过该值视为等距
pub const DISTANCE_EPSILON_KM: f64 = 1e-9;

/// 经纬度坐标
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub lat: f64,
    pub lon: f64,
}

impl Coordinate {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// 校验纬度 ∈ [-90, 90]、经度 ∈ [-180, 180]
    pub fn validate(&self) -> Result<()> {
        if !is_valid_latitude(self.lat) {
            return Err(FleetError::InvalidCoordinate(format!(
                "纬度超出范围 [-90, 90]: {}",
                self.lat
            )));
        }
        if !is_valid_longitude(self.lon) {
            return Err(FleetError::InvalidCoordinate(format!(
                "经度超出范围 [-180, 180]: {}",
                self.lon
            )));
        }
        Ok(())
    }

    /// 到另一坐标的大圆距离（公里）
    pub fn distance_to(&self, other: &Coordinate) -> f64 {
        haversine_km(self, other)
    }
}

pub fn is_valid_latitude(lat: f64) -> bool {
    lat.is_finite() && (-90.0..=90.0).contains(&lat)
}

pub fn is_valid_longitude(lon: f64) -> bool {
    lon.is_finite() && (-180.0..=180.0).contains(&lon)
}

/// haversine 公式计算两点间大圆距离（公里）
pub fn haversine_km(a: &Coordinate, b: &Coordinate) -> f64 {
    // 固定参数顺序，保证 haversine_km(a, b) 与 haversine_km(b, a) 按位相等
    let (a, b) = if (a.lat, a.lon) <= (b.lat, b.lon) {
        (a, b)
    } else {
        (b, a)
    };

    let lat1 = a.lat.to_radians();
    let lat2 = b.lat.to_radians();
    let delta_lat = (b.lat - a.lat).to_radians();
    let delta_lon = (b.lon - a.lon).to_radians();

    let h = (delta_lat / 2.0).sin().powi(2)
        + lat1.cos() * lat2.cos() * (delta_lon / 2.0).sin().powi(2);
    // 浮点误差可能让 h 略微超出 [0, 1]
    let h = h.clamp(0.0, 1.0);
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());

    EARTH_RADIUS_KM * c
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx_eq(a: f64, b: f64, tolerance: f64) -> bool {
        (a - b).abs() <= tolerance
    }

    #[test]
    fn test_distance_to_self_is_zero() {
        let points = [
            Coordinate::new(0.0, 0.0),
            Coordinate::new(40.7128, -74.0060),
            Coordinate::new(-33.8688, 151.2093),
            Coordinate::new(90.0, 180.0),
        ];
        for p in points {
            assert_eq!(haversine_km(&p, &p), 0.0);
        }
    }

    #[test]
    fn test_distance_is_symmetric() {
        let pairs = [
            (Coordinate::new(40.7128, -74.0060), Coordinate::new(40.730, -73.935)),
            (Coordinate::new(51.5074, -0.1278), Coordinate::new(48.8566, 2.3522)),
            (Coordinate::new(-89.9, 179.9), Coordinate::new(89.9, -179.9)),
            (Coordinate::new(0.0, 179.99), Coordinate::new(0.0, -179.99)),
        ];
        for (a, b) in pairs {
            assert_eq!(haversine_km(&a, &b), haversine_km(&b, &a));
        }
    }

    #[test]
    fn test_known_distances() {
        let new_york = Coordinate::new(40.7128, -74.0060);

        let near = haversine_km(&new_york, &Coordinate::new(40.7138, -74.0070));
        assert!(approx_eq(near, 0.139, 0.005), "near = {near}");

        let far = haversine_km(&new_york, &Coordinate::new(40.730, -73.935));
        assert!(approx_eq(far, 6.27, 0.1), "far = {far}");

        let london = Coordinate::new(51.5074, -0.1278);
        let paris = Coordinate::new(48.8566, 2.3522);
        assert!(approx_eq(haversine_km(&london, &paris), 343.5, 1.0));
    }

    #[test]
    fn test_distance_grows_with_separation() {
        let origin = Coordinate::new(10.0, 10.0);
        let mut last = 0.0;
        for step in 1..10 {
            let d = origin.distance_to(&Coordinate::new(10.0 + step as f64, 10.0));
            assert!(d > last);
            last = d;
        }
    }

    #[test]
    fn test_antipodal_points_are_half_circumference() {
        let a = Coordinate::new(0.0, 0.0);
        let b = Coordinate::new(0.0, 180.0);
        let expected = std::f64::consts::PI * EARTH_RADIUS_KM;
        assert!(approx_eq(haversine_km(&a, &b), expected, 1e-6));
    }

    #[test]
    fn test_coordinate_validation() {
        assert!(Coordinate::new(90.0, 180.0).validate().is_ok());
        assert!(Coordinate::new(-90.0, -180.0).validate().is_ok());
        assert!(Coordinate::new(90.0001, 0.0).validate().is_err());
        assert!(Coordinate::new(0.0, -180.5).validate().is_err());
        assert!(Coordinate::new(f64::NAN, 0.0).validate().is_err());
        assert!(Coordinate::new(0.0, f64::INFINITY).validate().is_err());

        let err = Coordinate::new(120.0, 0.0).validate().unwrap_err();
        assert!(matches!(err, FleetError::InvalidCoordinate(_)));
    }
}
