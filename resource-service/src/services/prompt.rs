/// Sent verbatim on every `/fetch_resources` call.
pub const EDUCATION_RESOURCES_PROMPT: &str = "Provide structured data in JSON format for education resources including: \
1. Scholarships & Grants (title, description, deadline, amount, eligibility, website)\n\
2. Career Opportunities (title, description, location, type, duration, format, level, website)\n\
3. Mentorship Programs (title, description, mentors available, duration, website)\n\
4. Skill Development (title, description, number of courses, level, format, website)\n\
Use the top-level keys scholarships_grants, career_opportunities, mentorship_programs and skill_development, \
each holding a list of objects with snake_case field names.\n\
Ensure the response is formatted correctly as a JSON dictionary with appropriate keys.";

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ResourceCategory;

    #[test]
    fn prompt_names_every_category_key() {
        for category in ResourceCategory::ALL {
            assert!(EDUCATION_RESOURCES_PROMPT.contains(category.key()));
        }
    }
}
