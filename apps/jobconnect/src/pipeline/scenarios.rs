use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

/// A canned resume and the search it should drive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Scenario {
    pub resume_text: &'static str,
    pub job_query: &'static str,
}

const fn scenario(resume_text: &'static str, job_query: &'static str) -> Scenario {
    Scenario {
        resume_text,
        job_query,
    }
}

pub const RESUME_SCENARIOS: [Scenario; 10] = [
    scenario(
        "Senior engineer, 5 years with Python, Angular, Spring Boot, SQL, AWS, Docker.",
        "python angular spring singapore",
    ),
    scenario(
        "Backend developer, 6+ years in Java, Spring Boot, Kafka, PostgreSQL, Redis, AWS ECS.",
        "java spring boot kafka postgres redis singapore",
    ),
    scenario(
        "Full-stack engineer with 4 years in React, Node.js, Express, MongoDB, CI/CD, Docker.",
        "react node express mongodb docker singapore",
    ),
    scenario(
        "Data engineer, 5 years in Python, Spark, Airflow, AWS Glue, S3, Redshift, SQL.",
        "data engineer python spark airflow redshift singapore",
    ),
    scenario(
        "DevOps engineer, 7 years in Kubernetes, Terraform, AWS, GitLab CI, Prometheus, Grafana.",
        "devops kubernetes terraform aws gitlab ci singapore",
    ),
    scenario(
        "Frontend engineer, 3 years in Angular, RxJS, TypeScript, Tailwind, Jest, Cypress.",
        "angular rxjs typescript jest cypress singapore",
    ),
    scenario(
        "Mobile developer, 4 years in Android (Kotlin), Jetpack, Retrofit, Firebase, CI/CD.",
        "android kotlin jetpack retrofit firebase singapore",
    ),
    scenario(
        "QA automation engineer, 5 years with Selenium, Playwright, Java, TestNG, REST Assured.",
        "qa automation selenium playwright java testng singapore",
    ),
    scenario(
        "ML engineer, 3 years in Python, PyTorch, Transformers, FastAPI, MLflow, AWS SageMaker.",
        "ml engineer pytorch transformers fastapi sagemaker singapore",
    ),
    scenario(
        "Platform engineer, 6 years in Go, Kubernetes, Helm, Istio, ArgoCD, Observability.",
        "platform engineer go kubernetes helm istio argocd singapore",
    ),
];

/// Same seed, same scenario. `None` picks from entropy.
pub fn pick(seed: Option<u64>) -> Scenario {
    let mut rng = seed.map(StdRng::seed_from_u64).unwrap_or_else(StdRng::from_entropy);
    *RESUME_SCENARIOS
        .choose(&mut rng)
        .unwrap_or(&RESUME_SCENARIOS[0])
}
