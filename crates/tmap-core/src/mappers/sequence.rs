use super::ObjectMapper;
use crate::pair::{MapRequest, TypePair};
use crate::plan::{PlanBuilder, PlanExpr};
use crate::registry::TypeRegistry;

/// Maps a list element by element.
///
/// The element plan is built like a member plan, so element maps inline
/// under the same depth bound and null elements follow the owning
/// profile's null policy.
pub struct SequenceMapper;

impl ObjectMapper for SequenceMapper {
    fn name(&self) -> &str {
        "sequence"
    }

    fn is_match(&self, pair: TypePair, types: &TypeRegistry) -> bool {
        types.list_element(pair.source).is_some() && types.list_element(pair.destination).is_some()
    }

    fn build_expression(&self, builder: &mut PlanBuilder<'_>, request: &MapRequest) -> PlanExpr {
        let config = builder.configuration();
        let types = config.types();
        let (Some(source), Some(destination)) = (
            types.list_element(request.runtime.source),
            types.list_element(request.runtime.destination),
        ) else {
            return PlanExpr::Identity;
        };
        let profile = request
            .member
            .as_ref()
            .and_then(|member| config.find_type_map(member.owner))
            .map(|owner| owner.profile().clone())
            .unwrap_or_else(|| config.default_profile().clone());
        let element =
            builder.member_expression(source, destination, request.member.clone(), &profile, None);
        PlanExpr::Sequence {
            element: Box::new(element),
        }
    }
}
