use crate::models::Department;

pub fn suggestions_for(department: Department) -> &'static [&'static str] {
    match department {
        Department::Engineering => &[
            "Implement automated testing to reduce bugs",
            "Consider code review best practices",
            "Improve documentation for better knowledge sharing",
            "Adopt agile methodologies for faster delivery",
        ],
        Department::Marketing => &[
            "Conduct market research for better targeting",
            "Develop personalized marketing campaigns",
            "Improve brand consistency across channels",
            "Focus on digital marketing strategies",
        ],
        Department::Sales => &[
            "Streamline the sales process",
            "Provide better sales training",
            "Implement CRM system for better tracking",
            "Improve lead qualification process",
        ],
        Department::Support => &[
            "Reduce response time with better staffing",
            "Implement chatbot for common queries",
            "Create comprehensive knowledge base",
            "Provide multi-channel support options",
        ],
        Department::Hr => &[
            "Simplify onboarding process",
            "Improve communication of policies",
            "Implement employee feedback system",
            "Provide better training programs",
        ],
        Department::Finance => &[
            "Automate routine financial processes",
            "Improve invoice processing time",
            "Provide better financial reporting",
            "Implement expense management system",
        ],
    }
}
