use crate::database::models::ChurchRole;

/// Pick the dashboard a user lands on from the full set of roles they hold,
/// strongest first. Everyone has somewhere to land; no role at all still
/// resolves to the member area.
pub fn landing_route(roles: &[ChurchRole]) -> &'static str {
    if roles.contains(&ChurchRole::Admin) || roles.contains(&ChurchRole::Pastor) {
        return "/app";
    }
    if roles.contains(&ChurchRole::Treasurer) {
        return "/finance";
    }
    if roles.contains(&ChurchRole::Secretary) {
        return "/secretariat";
    }
    if roles.contains(&ChurchRole::Consolidation) {
        return "/consolidation";
    }
    if roles.contains(&ChurchRole::CellLeader) {
        return "/cells";
    }
    if roles.contains(&ChurchRole::MinistryLeader) {
        return "/ministries";
    }
    "/my-app"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn admins_and_pastors_land_on_the_main_dashboard() {
        assert_eq!(landing_route(&[ChurchRole::Admin]), "/app");
        assert_eq!(landing_route(&[ChurchRole::Pastor]), "/app");
        assert_eq!(
            landing_route(&[ChurchRole::Member, ChurchRole::Pastor]),
            "/app"
        );
    }

    #[test]
    fn stronger_roles_win_regardless_of_order() {
        assert_eq!(
            landing_route(&[ChurchRole::Pastor, ChurchRole::CellLeader]),
            "/app"
        );
        assert_eq!(
            landing_route(&[ChurchRole::CellLeader, ChurchRole::Treasurer]),
            "/finance"
        );
        assert_eq!(
            landing_route(&[ChurchRole::MinistryLeader, ChurchRole::Secretary]),
            "/secretariat"
        );
        assert_eq!(
            landing_route(&[ChurchRole::Consolidation, ChurchRole::CellLeader]),
            "/consolidation"
        );
    }

    #[test]
    fn single_ministry_roles_route_to_their_areas() {
        assert_eq!(landing_route(&[ChurchRole::CellLeader]), "/cells");
        assert_eq!(landing_route(&[ChurchRole::MinistryLeader]), "/ministries");
    }

    #[test]
    fn members_and_empty_role_sets_land_on_the_member_area() {
        assert_eq!(landing_route(&[ChurchRole::Member]), "/my-app");
        assert_eq!(landing_route(&[]), "/my-app");
    }
}
